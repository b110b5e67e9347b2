use serde_json::Value;

use super::common::{run_compila, source_file, spawn_stub, stderr, stdout};

#[tokio::test]
async fn json_reports_console_with_first_round_tokens() {
    let (url, _seen) = spawn_stub().await;
    let (_dir, path) = source_file("int n = 10; pri(n);");

    let out = run_compila(&url, &["run", &path, "--json"], "").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let v: Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["outcome"], "succeeded");
    assert_eq!(v["console"]["status"], "succeeded");
    assert_eq!(v["console"]["output"][0], "10");
    assert_eq!(v["console"]["tokens"][0][0], "int");
    assert_eq!(v["console"]["tokens"][0][1], "TIPO_ENTERO");
    assert!(v["image_path"].is_null());
}

#[tokio::test]
async fn json_with_image_writes_file() {
    let (url, _seen) = spawn_stub().await;
    let (_dir, path) = source_file("draw2d(x**2, -10, 10);");
    let images = tempfile::tempdir().unwrap();
    let image_dir = images.path().to_string_lossy().into_owned();

    let out = run_compila(
        &url,
        &["run", &path, "--json", "--pretty", "--image-dir", &image_dir],
        "",
    )
    .await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains('\n'), "pretty output spans lines");
    let v: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["console"]["image"]["kind"], "png");
    assert_eq!(v["console"]["image"]["size"], 8);
    assert!(v["console"]["actions"][0]
        .as_str()
        .unwrap()
        .starts_with("draw2d expr=x**2"));
    let saved = v["image_path"].as_str().unwrap();
    assert!(saved.ends_with("compila-run1-0.png"));
    assert_eq!(std::fs::read(saved).unwrap(), b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn terminal_output_reports_saved_image() {
    let (url, _seen) = spawn_stub().await;
    let (_dir, path) = source_file("draw2d(x**2, -10, 10);");
    let images = tempfile::tempdir().unwrap();
    let image_dir = images.path().to_string_lossy().into_owned();

    let out = run_compila(&url, &["run", &path, "--image-dir", &image_dir], "").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("· draw2d expr=x**2 xmax=10 xmin=-10"));
    assert!(text.contains("[image/png, 8 bytes: "));
    assert!(images.path().join("compila-run1-0.png").exists());
}

#[tokio::test]
async fn json_with_stdin_answers_shows_prompts_on_stderr() {
    let (url, seen) = spawn_stub().await;
    let (_dir, path) = source_file("int a; put(a); pri(a);");

    let out = run_compila(&url, &["run", &path, "--json"], "4\n").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Ingrese valor 1:"));
    let v: Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["outcome"], "succeeded");
    assert_eq!(v["console"]["output"][2], "suma=4");
    assert_eq!(seen.lock().unwrap().last().unwrap().1, vec!["4"]);
}
