use super::common::{run_compila, source_file, spawn_stub, stderr, stdout};

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn preset_inputs_answer_prompts_and_output_is_not_repeated() {
    let (url, seen) = spawn_stub().await;
    let src = "int a; int b; put(a); put(b);";
    let (_dir, path) = source_file(src);

    let out = run_compila(
        &url,
        &["run", &path, "-i", "2", "-i", "3", "--no-interactive"],
        "",
    )
    .await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "Inicio\nIngrese valor 1:\n> 2\nleido 2\nIngrese valor 2:\n> 3\nleido 3\nsuma=5\n"
    );
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            (src.to_string(), vec![]),
            (src.to_string(), strings(&["2"])),
            (src.to_string(), strings(&["2", "3"])),
        ]
    );
}

#[tokio::test]
async fn stdin_answers_skip_blank_lines() {
    let (url, seen) = spawn_stub().await;
    let (_dir, path) = source_file("int a; put(a);");

    let out = run_compila(&url, &["run", &path], "\n4\n").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "Inicio\nIngrese valor 1:\nIngrese valor 1:\nleido 4\nsuma=4\n"
    );
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].1, strings(&["4"]));
}

#[tokio::test]
async fn end_of_stdin_abandons_the_run() {
    let (url, seen) = spawn_stub().await;
    let (_dir, path) = source_file("int a; put(a);");

    let out = run_compila(&url, &["run", &path], "").await;

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("input ended"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn no_interactive_fails_when_presets_run_out() {
    let (url, seen) = spawn_stub().await;
    let (_dir, path) = source_file("put(a); put(b);");

    let out = run_compila(&url, &["run", &path, "-i", "1", "--no-interactive"], "9\n").await;

    assert_eq!(out.status.code(), Some(1));
    assert!(!stdout(&out).contains("suma="));
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn source_from_stdin_runs_without_prompts() {
    let (url, seen) = spawn_stub().await;

    let out = run_compila(&url, &["run", "-"], "int n = 10;\npri(n);\n").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "10\n");
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("int n = 10;\npri(n);\n".to_string(), vec![])]);
}

#[tokio::test]
async fn repl_runs_buffer_and_reads_answers_from_following_lines() {
    let (url, seen) = spawn_stub().await;

    let out = run_compila(&url, &["repl"], "int a;\nput(a);\n.run\n7\n.quit\n").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Ingrese valor 1:"));
    assert!(text.contains("suma=7"));
    assert!(text.ends_with("Bye.\n"));
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[1], ("int a;\nput(a);".to_string(), strings(&["7"])));
}

#[tokio::test]
async fn repl_clear_while_awaiting_input_is_not_sent_as_an_answer() {
    let (url, seen) = spawn_stub().await;

    let out = run_compila(&url, &["repl"], "put(a);\n.run\n.clear\n.quit\n").await;

    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Ingrese valor 1:"));
    assert!(text.contains("(cleared)"));
    assert!(text.ends_with("Bye.\n"));
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec![("put(a);".to_string(), vec![])]);
}
