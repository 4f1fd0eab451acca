//! Confluence storage format snippets.
//!
//! Produces the XHTML storage format pieces the renderer and page layout
//! need:
//! - `ac:structured-macro` for code blocks, info panels, TOC and columns
//! - `ac:image` with `ri:url` or `ri:attachment` for images
//! - profile picture and user link for authors

use std::fmt::Write;

use mdconf_sync::Author;

use crate::state::escape_html;

/// Headings the TOC leaves out (the sidebar's own sections).
const TOC_EXCLUDE: &str = "^(Authors|Table of Contents)$";

pub fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
    if let Some(lang) = lang {
        write!(
            out,
            r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
            escape_html(lang)
        )
        .unwrap();
    }
    // CDATA content is not escaped, but cannot contain its own terminator
    write!(
        out,
        r"<ac:plain-text-body><![CDATA[{}]]></ac:plain-text-body>",
        content.replace("]]>", "]]]]><![CDATA[>")
    )
    .unwrap();
    out.push_str("</ac:structured-macro>");
}

pub fn info_start(out: &mut String) {
    out.push_str(r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:rich-text-body>"#);
}

pub fn info_end(out: &mut String) {
    out.push_str("</ac:rich-text-body></ac:structured-macro>");
}

/// Whether an image source points outside the page's attachments.
pub fn is_external(src: &str) -> bool {
    src.contains("://") || src.starts_with("//") || src.starts_with("data:")
}

pub fn image(src: &str, out: &mut String) {
    let inner = if is_external(src) {
        format!(r#"ri:url ri:value="{}""#, escape_html(src))
    } else {
        let filename = src.rsplit('/').next().unwrap_or(src);
        format!(r#"ri:attachment ri:filename="{}""#, escape_html(filename))
    };
    write!(out, "<ac:image><{inner} /></ac:image>").unwrap();
}

pub fn toc(out: &mut String) {
    write!(
        out,
        r#"<h1>Table of Contents</h1><p><ac:structured-macro ac:name="toc" ac:schema-version="1"><ac:parameter ac:name="exclude">{TOC_EXCLUDE}</ac:parameter></ac:structured-macro></p>"#
    )
    .unwrap();
}

pub fn column(width: &str, content: &str, out: &mut String) {
    write!(
        out,
        r#"<ac:structured-macro ac:name="column" ac:schema-version="1"><ac:parameter ac:name="width">{width}</ac:parameter><ac:rich-text-body>{content}</ac:rich-text-body></ac:structured-macro>"#
    )
    .unwrap();
}

/// User reference: `ri:userkey` on Server/Data Center, `ri:account-id` on Cloud.
fn user_ref(author: &Author) -> Option<String> {
    if let Some(key) = author.user_key.as_deref() {
        return Some(format!(r#"<ri:user ri:userkey="{}" />"#, escape_html(key)));
    }
    let account_id = author.account_id.as_deref()?;
    Some(format!(
        r#"<ri:user ri:account-id="{}" />"#,
        escape_html(account_id)
    ))
}

pub fn author(author: &Author, out: &mut String) -> bool {
    let Some(user) = user_ref(author) else {
        return false;
    };
    write!(
        out,
        r#"<ac:structured-macro ac:name="profile-picture" ac:schema-version="1"><ac:parameter ac:name="User">{user}</ac:parameter></ac:structured-macro>&#160;<ac:link>{user}</ac:link>"#
    )
    .unwrap();
    true
}
