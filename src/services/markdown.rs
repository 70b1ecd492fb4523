//! Markdown-lite: the handful of constructs bot replies actually use, turned
//! into an HTML fragment. Output is not escaped; only feed it trusted text.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_STARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?R)\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?R)__(.+?)__").unwrap());
static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.+?)```").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?R)`(.+?)`").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mR)^[-*] (.+)$").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mR)^[0-9]+\.\s(.+)$").unwrap());
static H3_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mR)^### (.+)$").unwrap());
static H2_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mR)^## (.+)$").unwrap());
static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mR)^# (.+)$").unwrap());

/// Substitutions in application order. Headings go most specific first.
static RULES: [(&Lazy<Regex>, &str); 9] = [
    (&BOLD_STARS_RE, "<strong>${1}</strong>"),
    (&BOLD_UNDERSCORES_RE, "<strong>${1}</strong>"),
    (&CODE_BLOCK_RE, "<pre><code>${1}</code></pre>"),
    (&INLINE_CODE_RE, "<code>${1}</code>"),
    (&BULLET_RE, "<li>${1}</li>"),
    (&NUMBERED_RE, "<li>${1}</li>"),
    (&H3_RE, "<h3>${1}</h3>"),
    (&H2_RE, "<h2>${1}</h2>"),
    (&H1_RE, "<h1>${1}</h1>"),
];

pub fn render(text: &str) -> String {
    let formatted = RULES.iter().fold(text.to_string(), |acc, (re, replacement)| {
        re.replace_all(&acc, *replacement).into_owned()
    });

    formatted.split("\n\n").map(wrap_paragraph).collect()
}

fn wrap_paragraph(para: &str) -> String {
    if para.contains("<li>") {
        format!("<ul>{}</ul>", para)
    } else if para.starts_with("<h") || para.starts_with("<pre>") {
        para.to_string()
    } else if para.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", para.replace('\n', "<br>"))
    }
}
