//! Server-rendered pages.
//!
//! Plain string templates with HTML escaping at every interpolation point;
//! the app has five pages and no client-side rendering.

use crate::hobbyhub::auth::Principal;

/// Escape text for safe interpolation into HTML element content.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} - HobbyHub</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|message| format!("    <li>{}</li>\n", escape_html(message)))
        .collect();
    format!("  <ul class=\"errors\">\n{items}  </ul>\n")
}

#[must_use]
pub fn home() -> String {
    layout(
        "Home",
        r#"  <h1>HobbyHub</h1>
  <p>Keep track of your hobbies.</p>
  <nav>
    <a href="/login">Log in</a>
    <a href="/register">Register</a>
  </nav>"#,
    )
}

#[must_use]
pub fn login(messages: &[String]) -> String {
    let body = format!(
        r#"  <h1>Log in</h1>
{errors}  <form method="post" action="/login">
    <label>Username <input type="email" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <label><input type="checkbox" name="remember_me" value="on"> Remember me</label>
    <button type="submit">Log in</button>
  </form>
  <p><a href="/auth/google">Sign in with Google</a></p>
  <p><a href="/auth/facebook">Sign in with Facebook</a></p>
  <p>No account? <a href="/register">Register</a></p>"#,
        errors = error_list(messages),
    );
    layout("Log in", &body)
}

#[must_use]
pub fn register(messages: &[String]) -> String {
    let body = format!(
        r#"  <h1>Register</h1>
{errors}  <form method="post" action="/register">
    <label>Username <input type="email" name="username" required></label>
    <label>Password <input type="password" name="password" required></label>
    <button type="submit">Register</button>
  </form>
  <p>Already registered? <a href="/login">Log in</a></p>"#,
        errors = error_list(messages),
    );
    layout("Register", &body)
}

#[must_use]
pub fn welcome(principal: &Principal) -> String {
    let hobbies = if principal.hobbies.is_empty() {
        "  <p>No hobbies yet. <a href=\"/submit\">Add one</a>.</p>\n".to_string()
    } else {
        let items: String = principal
            .hobbies
            .iter()
            .map(|hobby| format!("    <li>{}</li>\n", escape_html(hobby)))
            .collect();
        format!("  <ul>\n{items}  </ul>\n")
    };
    let body = format!(
        r#"  <h1>Welcome, {name}</h1>
  <h2>Your hobbies</h2>
{hobbies}  <nav>
    <a href="/submit">Add a hobby</a>
    <a href="/logout">Log out</a>
  </nav>"#,
        name = escape_html(&principal.name),
    );
    layout("Welcome", &body)
}

#[must_use]
pub fn submit_form() -> String {
    layout(
        "Add a hobby",
        r#"  <h1>Add a hobby</h1>
  <form method="post" action="/submit">
    <label>Hobby <input type="text" name="hobby" required></label>
    <button type="submit">Add</button>
  </form>
  <p><a href="/welcome">Back</a></p>"#,
    )
}

#[must_use]
pub fn server_error() -> String {
    layout(
        "Error",
        r#"  <h1>Something went wrong</h1>
  <p>Please try again later.</p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn escape_html_covers_specials() {
        assert_eq!(
            escape_html(r#"<b>&"it's"</b>"#),
            "&lt;b&gt;&amp;&quot;it&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn login_renders_messages() {
        let page = login(&["Invalid username or password".to_string()]);
        assert!(page.contains("Invalid username or password"));
        assert!(page.contains("remember_me"));
    }

    #[test]
    fn login_without_messages_has_no_error_list() {
        assert!(!login(&[]).contains("class=\"errors\""));
    }

    #[test]
    fn welcome_escapes_the_display_name() {
        let principal = Principal {
            user_id: Uuid::nil(),
            name: "<script>alert(1)</script>".to_string(),
            hobbies: vec!["chess".to_string()],
        };
        let page = welcome(&principal);
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("<li>chess</li>"));
    }

    #[test]
    fn welcome_without_hobbies_prompts_to_add() {
        let principal = Principal {
            user_id: Uuid::nil(),
            name: "alice@example.com".to_string(),
            hobbies: Vec::new(),
        };
        assert!(welcome(&principal).contains("No hobbies yet"));
    }
}
