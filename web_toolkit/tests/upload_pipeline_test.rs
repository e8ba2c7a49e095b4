use axum::body::Body;
use axum::extract::Request;
use axum::http::header;
use tempfile::TempDir;

use web_toolkit::{process_single_upload, process_upload, ToolkitError, UploadConfig};

const BOUNDARY: &str = "toolkit-test-boundary";

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    declared_type: &'a str,
    content: &'a [u8],
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(
            format!("Content-Type: {}\r\n\r\n", part.declared_type).as_bytes(),
        );
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(parts: &[Part<'_>]) -> Request {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn file_part<'a>(file_name: &'a str, declared_type: &'a str, content: &'a [u8]) -> Part<'a> {
    Part {
        name: "file",
        file_name: Some(file_name),
        declared_type,
        content,
    }
}

fn png_bytes(total_len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(total_len.max(data.len()), 0xAB);
    data
}

fn image_config() -> UploadConfig {
    UploadConfig {
        allowed_mime_types: ["image/jpeg".to_string(), "image/png".to_string()]
            .into_iter()
            .collect(),
        ..Default::default()
    }
}

fn files_on_disk(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn allowed_upload_without_rename_keeps_the_name() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(1024);
    let request = multipart_request(&[file_part("img.png", "image/png", &png)]);

    let files = process_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].original_name, "img.png");
    assert_eq!(files[0].new_name, "img.png");
    assert_eq!(files[0].size_bytes, png.len() as u64);

    let written = std::fs::read(dir.path().join("img.png")).unwrap();
    assert_eq!(written, png);
}

#[tokio::test]
async fn allowed_upload_with_rename_keeps_the_extension() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(600);
    let request = multipart_request(&[file_part("img.png", "image/png", &png)]);

    let files = process_upload(request, dir.path(), true, &image_config())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_ne!(files[0].new_name, files[0].original_name);
    assert!(files[0].new_name.ends_with(".png"));
    assert_eq!(files[0].new_name.len(), 25 + ".png".len());
    assert!(dir.path().join(&files[0].new_name).is_file());
}

#[tokio::test]
async fn disallowed_type_fails_the_batch_before_any_write() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(256);
    let request = multipart_request(&[file_part("img.png", "image/png", &png)]);
    let config = UploadConfig {
        allowed_mime_types: ["image/jpeg".to_string()].into_iter().collect(),
        ..Default::default()
    };

    let err = process_upload(request, dir.path(), false, &config)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ToolkitError::DisallowedFileType { content_type } if content_type == "image/png"),
        "unexpected error: {err:?}"
    );
    assert!(files_on_disk(&dir).is_empty());
}

#[tokio::test]
async fn client_declared_content_type_is_ignored() {
    let dir = TempDir::new().unwrap();
    // The part claims image/png but carries plain text.
    let request = multipart_request(&[file_part("img.png", "image/png", b"just some words")]);

    let err = process_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ToolkitError::DisallowedFileType { content_type } if content_type == "text/plain"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn multiple_parts_come_back_in_encounter_order() {
    let dir = TempDir::new().unwrap();
    let first = png_bytes(300);
    let second = png_bytes(900);
    let request = multipart_request(&[
        file_part("a.png", "image/png", &first),
        file_part("b.png", "image/png", &second),
    ]);

    let files = process_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].original_name, "a.png");
    assert_eq!(files[1].original_name, "b.png");
    assert_eq!(files[1].size_bytes, second.len() as u64);
    assert_eq!(files_on_disk(&dir), vec!["a.png", "b.png"]);
}

#[tokio::test]
async fn batch_failure_leaves_earlier_parts_on_disk() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(300);
    let request = multipart_request(&[
        file_part("a.png", "image/png", &png),
        file_part("notes.txt", "image/png", b"plain text smuggled in"),
    ]);

    let err = process_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::DisallowedFileType { .. }));
    // Fail-fast without rollback: the first part stays, the second was
    // never written.
    assert_eq!(files_on_disk(&dir), vec!["a.png"]);
}

#[tokio::test]
async fn declared_oversize_body_is_rejected_before_parsing() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(4096);
    let body = multipart_body(&[file_part("img.png", "image/png", &png)]);
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let config = UploadConfig {
        max_upload_size: 64,
        ..Default::default()
    };

    let err = process_upload(request, dir.path(), false, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::BodyTooLarge { limit: 64 }));
    assert!(files_on_disk(&dir).is_empty());
}

#[tokio::test]
async fn streamed_oversize_body_is_rejected_without_a_length_header() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(4096);
    let request = multipart_request(&[file_part("img.png", "image/png", &png)]);
    let config = UploadConfig {
        max_upload_size: 64,
        ..Default::default()
    };

    let err = process_upload(request, dir.path(), false, &config)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::BodyTooLarge { limit: 64 }));
    assert!(files_on_disk(&dir).is_empty());
}

#[tokio::test]
async fn garbage_body_is_a_malformed_upload() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from("this is not a multipart body"))
        .unwrap();

    let err = process_upload(request, dir.path(), false, &UploadConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::MalformedUpload(_)));
}

#[tokio::test]
async fn missing_boundary_is_a_malformed_upload() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "multipart/form-data")
        .body(Body::from("irrelevant"))
        .unwrap();

    let err = process_upload(request, dir.path(), false, &UploadConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::MalformedUpload(_)));
}

#[tokio::test]
async fn plain_form_fields_are_skipped() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(128);
    let request = multipart_request(&[
        Part {
            name: "caption",
            file_name: None,
            declared_type: "text/plain",
            content: b"holiday photo",
        },
        file_part("img.png", "image/png", &png),
    ]);

    let files = process_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].original_name, "img.png");
}

#[tokio::test]
async fn traversal_file_names_are_reduced_to_their_base_name() {
    let dir = TempDir::new().unwrap();
    let request = multipart_request(&[file_part(
        "../../outside/escape.txt",
        "text/plain",
        b"contained",
    )]);

    let files = process_upload(request, dir.path(), false, &UploadConfig::default())
        .await
        .unwrap();

    assert_eq!(files[0].new_name, "escape.txt");
    assert!(dir.path().join("escape.txt").is_file());
}

#[tokio::test]
async fn empty_allow_list_accepts_any_sniffed_type() {
    let dir = TempDir::new().unwrap();
    let request = multipart_request(&[file_part("notes.txt", "text/plain", b"anything goes")]);

    let files = process_upload(request, dir.path(), false, &UploadConfig::default())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size_bytes, "anything goes".len() as u64);
}

#[tokio::test]
async fn single_upload_returns_the_one_descriptor() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(200);
    let request = multipart_request(&[file_part("img.png", "image/png", &png)]);

    let file = process_single_upload(request, dir.path(), true, &image_config())
        .await
        .unwrap();

    assert!(file.new_name.ends_with(".png"));
    assert!(dir.path().join(&file.new_name).is_file());
}

#[tokio::test]
async fn single_upload_requires_exactly_one_file_part() {
    let dir = TempDir::new().unwrap();
    let png = png_bytes(200);

    let request = multipart_request(&[
        file_part("a.png", "image/png", &png),
        file_part("b.png", "image/png", &png),
    ]);
    let err = process_single_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolkitError::MalformedUpload(_)));

    let request = multipart_request(&[]);
    let err = process_single_upload(request, dir.path(), false, &image_config())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolkitError::MalformedUpload(_)));
}
