use tokio::net::TcpListener;

use super::common::{run_compila, source_file, spawn_stub, stdout};

#[tokio::test]
async fn lexical_error_lists_diagnostics_and_tokens() {
    let (url, _seen) = spawn_stub().await;
    let (_dir, path) = source_file("int a = 3 @ 4;");

    let out = run_compila(&url, &["run", &path, "--tokens"], "").await;

    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.starts_with("Lexical error:\n  Carácter no reconocido '@' en línea 1\n"));
    assert!(text.contains("Tokens (1):"));
    assert!(text.contains("DESCONOCIDO"));
}

#[tokio::test]
async fn runtime_error_shows_message() {
    let (url, _seen) = spawn_stub().await;
    let (_dir, path) = source_file("pri(1/0); // ERROR");

    let out = run_compila(&url, &["run", &path], "").await;

    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("Runtime error: Error de ejecución: división por cero"));
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/compilar", listener.local_addr().unwrap());
    drop(listener);
    let (_dir, path) = source_file("pri(1);");

    let out = run_compila(&url, &["run", &path], "").await;

    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("Connection error: request failed"));
}
