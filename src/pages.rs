//! Server-rendered pages, built as plain strings behind `warp::reply::html`.

use warp::http::StatusCode;

use crate::flash::Flash;
use crate::user::SessionUser;

/// Escape a user-supplied string for embedding in HTML text or attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let flash_block = match flash {
        Some(flash) => format!(
            r#"<p class="flash flash-{}">{}</p>"#,
            flash.level,
            escape(&flash.message),
        ),
        None => String::new(),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{title} &middot; SpamCheck</title>
</head>
<body>
<nav>
<a href="/">Home</a>
<a href="/predict">Check SMS</a>
<a href="/dashboard">Dashboard</a>
<a href="/login">Login</a>
<a href="/signup">Signup</a>
<a href="/about">About</a>
<a href="/logout">Logout</a>
</nav>
{flash_block}
{body}
</body>
</html>
"#
    )
}

pub fn index(flash: Option<&Flash>) -> String {
    layout(
        "Home",
        flash,
        "<h1>SpamCheck</h1>\n\
         <p>Paste an SMS and find out whether it's spam. \
         <a href=\"/signup\">Sign up</a> or <a href=\"/login\">log in</a> to get started.</p>",
    )
}

pub fn about(flash: Option<&Flash>) -> String {
    layout(
        "About",
        flash,
        "<h1>About</h1>\n\
         <p>SpamCheck labels SMS messages using a text-classification pipeline: \
         messages are lowercased, stripped of stop-words and stemmed before \
         being scored.</p>",
    )
}

pub fn predict(flash: Option<&Flash>) -> String {
    layout(
        "Check SMS",
        flash,
        r#"<h1>Check an SMS</h1>
<form method="post" action="/predict">
<label>Message: <textarea name="sms" rows="4" cols="40"></textarea></label>
<button type="submit">Check</button>
</form>"#,
    )
}

pub fn result(sms: &str, label: &str) -> String {
    let body = format!(
        "<h1>Result</h1>\n\
         <p>Your message:</p>\n\
         <blockquote>{}</blockquote>\n\
         <p>Verdict: <strong>{}</strong></p>\n\
         <p><a href=\"/predict\">Check another</a></p>",
        escape(sms),
        escape(label),
    );
    layout("Result", None, &body)
}

pub fn signup(flash: Option<&Flash>) -> String {
    layout(
        "Signup",
        flash,
        r#"<h1>Sign up</h1>
<form method="post" action="/signup">
<label>Username: <input type="text" name="username" required></label>
<label>Email: <input type="email" name="email" required></label>
<label>Password: <input type="password" name="password" required></label>
<button type="submit">Sign up</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
    )
}

pub fn login(flash: Option<&Flash>) -> String {
    layout(
        "Login",
        flash,
        r#"<h1>Log in</h1>
<form method="post" action="/login">
<label>Email: <input type="email" name="email" required></label>
<label>Password: <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p><a href="/forgot-password">Forgot password?</a></p>
<p>No account? <a href="/signup">Sign up</a></p>"#,
    )
}

pub fn dashboard(user: &SessionUser, flash: Option<&Flash>) -> String {
    let body = format!(
        "<h1>Welcome, {}</h1>\n\
         <p>Signed in as {}.</p>\n\
         <p><a href=\"/predict\">Check an SMS</a> or <a href=\"/logout\">log out</a>.</p>",
        escape(&user.username),
        escape(&user.email),
    );
    layout("Dashboard", flash, &body)
}

pub fn forgot_password(flash: Option<&Flash>) -> String {
    layout(
        "Forgot password",
        flash,
        r#"<h1>Forgot password</h1>
<form method="post" action="/forgot-password">
<label>Email: <input type="email" name="email" required></label>
<button type="submit">Send reset instructions</button>
</form>"#,
    )
}

pub fn error(status: StatusCode) -> String {
    let body = format!(
        "<h1>{status}</h1>\n<p>Something went wrong. Please try again.</p>"
    );
    layout("Error", None, &body)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"free" & 'easy'</b>"#),
            "&lt;b&gt;&quot;free&quot; &amp; &#39;easy&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn flash_is_rendered_once_present() {
        let flash = Flash::danger("Invalid Email or Password");

        let with = login(Some(&flash));
        assert!(with.contains("flash-danger"));
        assert!(with.contains("Invalid Email or Password"));

        let without = login(None);
        assert!(!without.contains("flash-"));
    }

    #[test]
    fn result_escapes_the_message() {
        let page = result("<script>alert(1)</script>", "spam");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("<strong>spam</strong>"));
    }

    #[test]
    fn dashboard_shows_the_session_user() {
        let user = crate::user::SessionUser {
            id: 1,
            username: "rob".into(),
            email: "rob@example.com".into(),
        };

        let page = dashboard(&user, None);
        assert!(page.contains("Welcome, rob"));
        assert!(page.contains("rob@example.com"));
    }
}
