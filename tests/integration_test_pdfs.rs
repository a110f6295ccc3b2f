mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{multipart_pdf, TestApp, TestResponse};

const SAMPLE: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF";

async fn upload(app: &TestApp, cookie: &str, uri: &str, content_type: &str, bytes: &[u8]) -> TestResponse {
    let (multipart_type, body) = multipart_pdf("pdf", "aula 1.pdf", content_type, bytes);
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, multipart_type)
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn test_pdf_upload_lock_and_download() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.approved_user("leitor", "segredo1").await;
    let leitor = app.login("leitor", "segredo1").await;

    // 1. Upload
    let res = upload(&app, &admin, "/api/pdfs", "application/pdf", SAMPLE).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let id = res.body["pdf"]["id"].as_str().unwrap().to_string();
    assert_eq!(res.body["pdf"]["nome"], "aula 1.pdf");
    assert_eq!(res.body["pdf"]["bloqueado"], false);
    assert!(res.body["pdf"].get("dados").is_none());

    // 2. Listagem sem conteúdo
    let res = app.call("GET", "/api/pdfs", Some(&leitor), None).await;
    let pdfs = res.body["pdfs"].as_array().unwrap();
    assert_eq!(pdfs.len(), 1);
    assert!(pdfs[0].get("dados").is_none());

    // 3. Download livre enquanto desbloqueado
    let res = app.call("GET", &format!("/api/pdfs/{}/download", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.raw, SAMPLE);
    let disposition = res.headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert_eq!(res.headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");

    // 4. Só o administrador bloqueia
    let res = app.call("PUT", &format!("/api/pdfs/{}/toggle-lock", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call("PUT", &format!("/api/pdfs/{}/toggle-lock", id), Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["pdf"]["bloqueado"], true);

    // 5. Bloqueado: download recusado ao aluno, visualização continua
    let res = app.call("GET", &format!("/api/pdfs/{}/download", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["success"], false);
    let res = app.call("GET", &format!("/api/pdfs/{}", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.raw, SAMPLE);
    let res = app.call("GET", &format!("/api/pdfs/{}/download", id), Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);

    // 6. Desbloquear devolve ao estado inicial
    let res = app.call("PUT", &format!("/api/pdfs/{}/toggle-lock", id), Some(&admin), None).await;
    assert_eq!(res.body["pdf"]["bloqueado"], false);
    let res = app.call("GET", &format!("/api/pdfs/{}/download", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::OK);

    // 7. Excluir
    let res = app.call("DELETE", &format!("/api/pdfs/{}", id), Some(&leitor), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call("DELETE", &format!("/api/pdfs/{}", id), Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.call("GET", "/api/pdfs", Some(&admin), None).await;
    assert!(res.body["pdfs"].as_array().unwrap().is_empty());
    let res = app.call("GET", "/api/pdfs/excluidos", Some(&admin), None).await;
    assert_eq!(res.body["pdfs"].as_array().unwrap().len(), 1);
    let res = app.call("GET", &format!("/api/pdfs/{}", id), Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pdf_upload_rejections() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.approved_user("aluno", "segredo1").await;
    let aluno = app.login("aluno", "segredo1").await;

    let res = upload(&app, &aluno, "/api/pdfs", "application/pdf", SAMPLE).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = upload(&app, &admin, "/api/pdfs", "text/plain", b"ola").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Acima do limite configurado (64 KB nos testes)
    let big = vec![b'x'; 80 * 1024];
    let res = upload(&app, &admin, "/api/upload-pdf", "application/pdf", &big).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    // Alias de upload
    let res = upload(&app, &admin, "/api/upload-pdf", "application/pdf", SAMPLE).await;
    assert_eq!(res.status, StatusCode::CREATED);
}
