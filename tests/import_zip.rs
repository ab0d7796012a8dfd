//! End-to-end imports through the public API.
//!
//! Archives are built in memory with deflate compression, the way real
//! uploads arrive, and run through `import_zip` with default config.

use site_import::config::ImportConfig;
use site_import::import::{ImportError, import_zip};
use site_import::types::{AssetKind, ZipImportResult};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

fn deflated_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn import(entries: &[(&str, &[u8])]) -> ZipImportResult {
    import_zip(
        "site.zip",
        &deflated_zip(entries),
        &ImportConfig::default(),
        None,
    )
    .unwrap()
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine;
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[test]
fn full_site_is_self_contained() {
    let result = import(&[
        (
            "index.html",
            br#"<html><head><title>Home</title><link rel="stylesheet" href="style.css"></head><body><img src="logo.png"></body></html>"#,
        ),
        ("style.css", b"body{background:url(bg.png)}"),
        ("logo.png", PNG),
        ("bg.png", PNG),
    ]);

    assert_eq!(result.site_name, "site");
    assert_eq!(result.pages.len(), 1);
    let page = &result.pages[0];
    assert!(page.is_main);
    assert_eq!(page.slug, "");
    assert_eq!(page.title, "Home");

    let png = data_uri("image/png", PNG);
    assert!(!page.html_content.contains("<link"));
    assert!(
        page.html_content
            .contains(&format!("<style>\nbody{{background:url(\"{png}\")}}\n</style>"))
    );
    assert!(page.html_content.contains(&format!(r#"<img src="{png}">"#)));
}

#[test]
fn main_page_precedes_earlier_entries() {
    let result = import(&[
        ("about.html", b"<title>About</title>"),
        ("index.html", b"<title>Home</title>"),
    ]);
    assert!(result.pages[0].is_main);
    assert_eq!(result.pages[0].file_name, "index.html");
    assert_eq!(result.pages[1].file_name, "about.html");
}

#[test]
fn unresolvable_reference_left_intact() {
    let html = r#"<img src="img/missing.png"><link rel="stylesheet" href="gone.css">"#;
    let result = import(&[("index.html", html.as_bytes())]);
    assert_eq!(result.pages[0].html_content, html);
}

#[test]
fn wrapper_directory_and_nested_references() {
    let result = import(&[
        ("my-site/index.html", br#"<a href="pages/about.html">About</a>"#),
        (
            "my-site/pages/about.html",
            br#"<title>About us</title><img src="../img/team%20photo.png"><script src="/js/app.js"></script>"#,
        ),
        ("my-site/img/team photo.png", PNG),
        ("my-site/js/app.js", b"init();"),
        ("__MACOSX/my-site/._index.html", b"junk"),
    ]);

    assert_eq!(result.pages.len(), 2);
    let about = &result.pages[1];
    assert_eq!(about.file_name, "pages/about.html");
    assert_eq!(about.slug, "pages/about");
    assert_eq!(about.title, "About us");
    assert!(about.html_content.contains(&data_uri("image/png", PNG)));
    assert!(about.html_content.contains("<script>init();</script>"));

    // Links between pages are not assets
    assert_eq!(
        result.pages[0].html_content,
        r#"<a href="pages/about.html">About</a>"#
    );
}

#[test]
fn external_references_are_byte_identical() {
    let html = concat!(
        r#"<link rel="stylesheet" href="https://cdn.example.com/x.css">"#,
        r#"<script src="//cdn.example.com/x.js"></script>"#,
        r#"<img src="data:image/gif;base64,R0lGOD">"#,
        r##"<a href="mailto:me@example.com">mail</a><a href="#top">top</a>"##,
    );
    let result = import(&[("index.html", html.as_bytes()), ("x.css", b"p{}")]);
    assert_eq!(result.pages[0].html_content, html);
}

#[test]
fn asset_inventory_in_archive_order() {
    let result = import(&[
        ("index.html", b""),
        ("fonts/a.woff2", b"wOF2"),
        ("css/site.css", b"p{}"),
        ("img/logo.png", PNG),
    ]);
    let inventory: Vec<_> = result
        .assets
        .iter()
        .map(|a| (a.path.as_str(), a.kind, a.mime_type.as_str()))
        .collect();
    assert_eq!(
        inventory,
        vec![
            ("fonts/a.woff2", AssetKind::Font, "font/woff2"),
            ("css/site.css", AssetKind::Style, "text/css"),
            ("img/logo.png", AssetKind::Image, "image/png"),
        ]
    );
}

#[test]
fn output_is_deterministic() {
    let entries: &[(&str, &[u8])] = &[
        ("b.html", br#"<body><nav>n</nav><img src="a.png"></body>"#),
        ("index.html", br#"<link rel="stylesheet" href="s.css">"#),
        ("a.html", b"<title>A</title>"),
        ("a.png", PNG),
        ("s.css", b"div{background:url(a.png)}"),
    ];
    let runs: Vec<String> = (0..3)
        .map(|_| serde_json::to_string(&import(entries)).unwrap())
        .collect();
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[1], runs[2]);
}

#[test]
fn result_json_shape() {
    let result = import(&[("index.html", b"<title>Home</title><body><footer>f</footer></body>")]);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["siteName"], "site");
    assert_eq!(json["pages"][0]["fileName"], "index.html");
    assert_eq!(json["pages"][0]["isMain"], true);
    assert_eq!(json["pages"][0]["slug"], "");
    assert_eq!(json["pages"][0]["blocks"][0]["type"], "FooterBlock01");
    assert_eq!(json["pages"][0]["blocks"][0]["category"], "footer");
    assert_eq!(json["pages"][0]["blocks"][0]["settings"]["paddingTop"], "60px");
}

#[test]
fn corrupt_archive_is_an_error() {
    let mut bytes = deflated_zip(&[("index.html", b"<p>x</p>")]);
    bytes.truncate(bytes.len() / 2);
    let result = import_zip("site.zip", &bytes, &ImportConfig::default(), None);
    assert!(matches!(result, Err(ImportError::Archive(_))));
}
