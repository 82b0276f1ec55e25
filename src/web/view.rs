//! HTML rendering of the file listing page.

use std::fmt::Write;

use crate::share::FileInfo;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
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

/// Download link for a file.
pub fn download_href(name: &str) -> String {
    format!("/files/{}", urlencoding::encode(name))
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Files</title>
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; }
th, td { padding: 0.3em 1em; border-bottom: 1px solid #ddd; text-align: left; }
td.size { text-align: right; }
</style>
</head>
<body>
<h1>Files</h1>
<form method="post" action="/" enctype="multipart/form-data">
<input type="file" name="file" required>
<button type="submit">Upload</button>
</form>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Render the listing page.
pub fn render_index(files: &[FileInfo]) -> String {
    let mut html = String::from(PAGE_HEAD);

    if files.is_empty() {
        html.push_str("<p>No files.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th>Name</th><th>Size</th><th>Created</th><th>Changed</th></tr></thead>\n<tbody>\n",
        );
        for file in files {
            // Writing to a String cannot fail.
            let _ = writeln!(
                html,
                "<tr><td><a href=\"{href}\">{name}</a></td><td class=\"size\">{size}</td>\
                 <td>{cdate} {ctime}</td><td>{edate} {etime}</td></tr>",
                href = escape_html(&download_href(&file.name)),
                name = escape_html(&file.name),
                size = escape_html(&file.size),
                cdate = escape_html(&file.creation_date),
                ctime = escape_html(&file.creation_time),
                edate = escape_html(&file.edit_date),
                etime = escape_html(&file.edit_time),
            );
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str(PAGE_TAIL);
    html
}
