//! Bare HTML shells for the browser-facing paths. They carry no data of
//! their own; the access-control middleware decides who reaches them.

use axum::response::Html;

use crate::auth::AuthUser;

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | Expense Tracker</title></head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    ))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn signed_in(user: &AuthUser) -> String {
    format!(
        "<p>Signed in as {} ({})</p>",
        escape(&user.0.username),
        user.0.role
    )
}

pub async fn login_page() -> Html<String> {
    shell("Login", "<p>POST your email and password to <code>/api/login</code>.</p>")
}

pub async fn set_password_page() -> Html<String> {
    shell(
        "Set password",
        "<p>POST the token from your invitation and a new password to <code>/api/set-password</code>.</p>",
    )
}

pub async fn dashboard_page(user: AuthUser) -> Html<String> {
    shell("Dashboard", &signed_in(&user))
}

pub async fn expenses_page(user: AuthUser) -> Html<String> {
    shell("Expenses", &signed_in(&user))
}

pub async fn categories_page(user: AuthUser) -> Html<String> {
    shell("Categories", &signed_in(&user))
}

pub async fn budgets_page(user: AuthUser) -> Html<String> {
    shell("Budgets", &signed_in(&user))
}

pub async fn monitoring_page(user: AuthUser) -> Html<String> {
    shell("Monitoring", &signed_in(&user))
}

pub async fn users_page(user: AuthUser) -> Html<String> {
    shell("Users", &signed_in(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }
}
