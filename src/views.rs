//! HTML rendering for the browser-facing pages.

use crate::latency::LatencySample;
use crate::models::{UploadedFile, UPLOAD_FIELD};

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

pub fn upload_form() -> String {
    page(
        "Upload photos",
        &format!(
            "<h1>Upload photos</h1>\n\
             <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
             <input type=\"file\" name=\"{}\" accept=\"image/*\" multiple>\n\
             <input type=\"submit\" value=\"Upload\">\n\
             </form>\n\
             <p><a href=\"/photos\">View uploaded photos</a></p>",
            UPLOAD_FIELD
        ),
    )
}

/// Inline result of an upload: one heading and image per stored file
pub fn upload_result(files: &[UploadedFile]) -> String {
    let items: String = files
        .iter()
        .map(|file| {
            format!(
                "<h1>{}</h1><img src=\"{}\" alt=\"imagetext\" /><br/>",
                escape_html(&file.file_name),
                escape_html(&file.url)
            )
        })
        .collect();
    format!("<p>Uploaded: <br />{}</p>", items)
}

pub fn gallery(container: &str, urls: &[String]) -> String {
    let body = if urls.is_empty() {
        "<p>No photos uploaded yet.</p>".to_string()
    } else {
        urls.iter()
            .map(|url| {
                format!(
                    "<div><img src=\"{url}\" alt=\"photo\" width=\"320\" />\
                     <form method=\"post\" action=\"/delete\">\
                     <input type=\"hidden\" name=\"url\" value=\"{url}\">\
                     <input type=\"submit\" value=\"Delete\"></form></div>",
                    url = escape_html(url)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    page(
        "Photos",
        &format!(
            "<h1>Photos in {}</h1>\n{}\n<p><a href=\"/\">Upload more</a></p>",
            escape_html(container),
            body
        ),
    )
}

pub fn deleted(url: &str) -> String {
    page(
        "Deleted",
        &format!(
            "<p>Deleted {}</p><p><a href=\"/photos\">Back to photos</a></p>",
            escape_html(url)
        ),
    )
}

pub fn latency_table(samples: &[LatencySample]) -> String {
    let rows: String = samples
        .iter()
        .map(|sample| {
            let seconds = sample
                .seconds
                .map(|s| format!("{:.3}", s))
                .unwrap_or_else(|| "n/a".to_string());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&sample.region),
                seconds,
                escape_html(&sample.url)
            )
        })
        .collect();

    page(
        "Latency",
        &format!(
            "<h1>Latency by region</h1>\n<table>\n<tr><th>Region</th><th>Seconds</th><th>URL</th></tr>\n{}</table>",
            rows
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<img src=x onerror='a&b'>"),
            "&lt;img src=x onerror=&#x27;a&amp;b&#x27;&gt;"
        );
    }

    #[test]
    fn test_upload_result_lists_each_file() {
        let html = upload_result(&[
            UploadedFile {
                file_name: "a.jpg".to_string(),
                url: "https://acct.blob.core.windows.net/photos/1jpg".to_string(),
            },
            UploadedFile {
                file_name: "<b>.png".to_string(),
                url: "https://acct.blob.core.windows.net/photos/2png".to_string(),
            },
        ]);

        assert!(html.starts_with("<p>Uploaded: <br />"));
        assert!(html.contains("<h1>a.jpg</h1><img src=\"https://acct.blob.core.windows.net/photos/1jpg\""));
        assert!(html.contains("<h1>&lt;b&gt;.png</h1>"));
    }

    #[test]
    fn test_latency_table_formats_three_decimals() {
        let html = latency_table(&[
            LatencySample {
                region: "East US".to_string(),
                url: "https://e.example/p.jpg".to_string(),
                seconds: Some(0.5),
            },
            LatencySample {
                region: "West Europe".to_string(),
                url: "https://w.example/p.jpg".to_string(),
                seconds: None,
            },
        ]);

        assert!(html.contains("<td>East US</td><td>0.500</td>"));
        assert!(html.contains("<td>West Europe</td><td>n/a</td>"));
    }

    #[test]
    fn test_empty_gallery() {
        assert!(gallery("photos", &[]).contains("No photos uploaded yet."));
    }
}
