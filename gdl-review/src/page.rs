use maud::{DOCTYPE, Markup, html};

use crate::records::ProcessedRecord;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:1em auto}\
img{max-width:100%;max-height:70vh;display:block;margin:0 auto 1em}\
textarea{width:100%;min-height:8em}\
nav a{margin-right:1em}";

/// Everything shown for one image.
#[derive(Debug)]
pub struct PageView<'a> {
    pub filename: &'a str,
    pub label: &'a str,
    pub index: usize,
    pub total: usize,
    pub processed: usize,
    pub record: ProcessedRecord,
}

/// URL of an image under `/images/`, with every path segment percent-encoded.
pub fn image_url(filename: &str) -> String {
    let encoded = filename
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/");
    format!("/images/{encoded}")
}

pub fn render(view: &PageView) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Review " (view.index + 1) "/" (view.total) }
                style { (STYLE) }
            }
            body {
                nav {
                    @if view.index > 0 {
                        a href={ "/?index=" (view.index - 1) "&update=true" } { "Previous" }
                    }
                    @if view.index + 1 < view.total {
                        a href={ "/?index=" (view.index + 1) "&update=true" } { "Next" }
                    }
                    a href="/?random=true" { "Random" }
                    span { (view.index + 1) " of " (view.total) ", " (view.processed) " reviewed" }
                }
                h3 { (view.filename) }
                img src=(image_url(view.filename)) alt=(view.filename);
                form method="post" action="/save" {
                    input type="hidden" name="filename" value=(view.filename);
                    input type="hidden" name="index" value=(view.index);
                    textarea name="label" { (view.label) }
                    p {
                        label {
                            input type="checkbox" name="confirmed" checked[view.record.confirmed];
                            " Confirm"
                        }
                        " "
                        label {
                            input type="checkbox" name="skip" checked[view.record.skipped];
                            " Skip"
                        }
                    }
                    button type="submit" { "Save" }
                }
            }
        }
    }
}
