//! Shared helpers for e2e tests: a stateless stub of the compile service and a binary runner.
//!
//! The stub understands just enough of the toy language to exercise every response kind:
//! - a source containing `@` gets a lexical error;
//! - a source containing `ERROR` gets a generic error;
//! - every `put(` asks for one input; once all are answered the inputs are summed;
//! - `draw2d` returns a PNG;
//! - anything else prints `10`.

use std::collections::HashMap;
use std::process::{Output, Stdio};
use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::post, Form, Json, Router};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Every request the stub received, as `(codigo, inputs)`.
pub type Seen = Arc<Mutex<Vec<(String, Vec<String>)>>>;

/// PNG signature only; enough for magic-byte sniffing.
pub const PNG_B64: &str = "iVBORw0KGgo=";

fn reply(source: &str, inputs: &[String]) -> Value {
    if source.contains('@') {
        return json!({
            "estado": "error_lexico",
            "errores": ["Carácter no reconocido '@' en línea 1"],
            "tokens": [["@", "DESCONOCIDO"]],
        });
    }
    if source.contains("ERROR") {
        return json!({"estado": "error", "mensaje": "Error de ejecución: división por cero"});
    }
    let wanted = source.matches("put(").count();
    if inputs.len() < wanted {
        let before: Vec<String> = std::iter::once("Inicio".to_string())
            .chain(inputs.iter().map(|v| format!("leido {}", v)))
            .collect();
        return json!({
            "estado": "esperando_input",
            "inputs_pendientes": [{
                "mensaje": format!("Ingrese valor {}:", inputs.len() + 1),
                "salida": before,
            }],
        });
    }
    if wanted > 0 {
        let sum: i64 = inputs.iter().filter_map(|v| v.trim().parse::<i64>().ok()).sum();
        let mut lines = vec!["Inicio".to_string()];
        lines.extend(inputs.iter().map(|v| format!("leido {}", v)));
        lines.push(format!("suma={}", sum));
        return json!({"estado": "correcto", "texto": lines.join("\n")});
    }
    if source.contains("draw2d") {
        return json!({
            "estado": "correcto",
            "texto": "",
            "imagen": PNG_B64,
            "acciones": [{"type": "draw2d", "expr": "x**2", "xmin": -10, "xmax": 10}],
        });
    }
    json!({
        "estado": "correcto",
        "texto": "10",
        "tokens": [["int", "TIPO_ENTERO"], ["n", "IDENTIFICADOR"]],
    })
}

async fn compilar(
    State(seen): State<Seen>,
    Form(fields): Form<HashMap<String, String>>,
) -> Json<Value> {
    let source = fields.get("codigo").cloned().unwrap_or_default();
    let inputs: Vec<String> = fields
        .get("inputs")
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    eprintln!("[e2e] received: codigo={:?} inputs={:?}", source, inputs);
    let body = reply(&source, &inputs);
    seen.lock().unwrap().push((source, inputs));
    Json(body)
}

/// Starts the stub on an ephemeral port; returns its `/compilar` URL and the request log.
pub async fn spawn_stub() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/compilar", post(compilar))
        .with_state(Arc::clone(&seen));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/compilar", addr), seen)
}

/// Runs `compila --endpoint <url> <args>` with `stdin` piped in, isolated from user config.
pub async fn run_compila(url: &str, args: &[&str], stdin: &str) -> Output {
    let config_home = tempfile::tempdir().unwrap();
    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_compila"))
        .arg("--endpoint")
        .arg(url)
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("COMPILA_ENDPOINT")
        .env_remove("COMPILA_TIMEOUT_SECS")
        .env_remove("COMPILA_IMAGE_DIR")
        .env_remove("COMPILA_ENCODING")
        .env_remove("LOG_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run compila binary");
    let mut pipe = child.stdin.take().unwrap();
    // The child may exit before reading everything.
    let _ = pipe.write_all(stdin.as_bytes()).await;
    drop(pipe);
    let out = child.wait_with_output().await.unwrap();
    eprintln!("[e2e] stdout: {}", String::from_utf8_lossy(&out.stdout));
    eprintln!("[e2e] stderr: {}", String::from_utf8_lossy(&out.stderr));
    out
}

/// Writes `source` to a temp file and returns the dir guard and file path.
pub fn source_file(source: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.txt");
    std::fs::write(&path, source).unwrap();
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}
