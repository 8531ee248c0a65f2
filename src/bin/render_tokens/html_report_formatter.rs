use std::fs;
use std::io::{self, Write};
use std::path::Path;

use logprob_viz::{bucket_color, ProbabilityBucket};

pub fn write_fragment(path: Option<&Path>, fragment: &str) -> Result<(), String> {
    write_output(path, fragment)
}

pub fn write_page(path: Option<&Path>, fragment: &str) -> Result<(), String> {
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Token probabilities</title>\n<style>\n{}</style>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n",
        bucket_stylesheet()
    );
    write_output(path, &page)
}

fn bucket_stylesheet() -> String {
    let mut css = String::from(
        ".token { padding: 0 1px; border-radius: 2px; white-space: pre-wrap; }\n",
    );
    for bucket in ProbabilityBucket::ALL {
        css.push_str(&format!(
            ".{} {{ color: {}; }}\n",
            bucket.css_class(),
            bucket_color(bucket)
        ));
    }
    // The span background already carries the bucket color.
    css.push_str(".token.high-prob, .token.medium-high-prob, .token.medium-prob, .token.medium-low-prob, .token.low-prob, .token.unknown-prob { color: #000000; }\n");
    css
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<(), String> {
    let Some(path) = path else {
        return io::stdout()
            .lock()
            .write_all(contents.as_bytes())
            .map_err(|err| format!("Failed to write markup to stdout: {err}"));
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, contents)
        .map_err(|err| format!("Failed to write markup '{}': {err}", path.display()))
}
