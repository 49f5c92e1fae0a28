pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::users::handlers as users;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Users and favourites
        .route(
            "/api/users",
            get(users::handle_get_user).post(users::handle_save_user),
        )
        .route(
            "/api/favourites",
            get(users::handle_get_favourites)
                .post(users::handle_add_favourite)
                .delete(users::handle_remove_favourite),
        )
        // Authentication
        .route("/api/signup", post(auth::handle_signup))
        .route("/api/confirm", post(auth::handle_confirm))
        .route(
            "/api/resend-confirmation",
            post(auth::handle_resend_confirmation),
        )
        .route("/api/login", post(auth::handle_login))
        .route("/api/session", get(auth::handle_session))
        // Resume import
        .route(
            "/api/resume/parse",
            get(resume::handle_parse_usage)
                .post(resume::handle_parse_resume)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Catalog
        .route(
            "/api/professionals",
            get(catalog::handle_list_professionals),
        )
        .route(
            "/api/professionals/filters",
            get(catalog::handle_professional_filters),
        )
        .route(
            "/api/professionals/:id",
            get(catalog::handle_get_professional),
        )
        .route(
            "/api/talent-requests",
            get(catalog::handle_list_talent_requests).post(catalog::handle_create_talent_request),
        )
        .route(
            "/api/talent-requests/:id",
            get(catalog::handle_get_talent_request),
        )
        .route(
            "/api/talent-requests/:id/interest",
            post(catalog::handle_express_interest),
        )
        // Admin moderation
        .route(
            "/api/admin/profiles/pending",
            get(admin::handle_list_pending),
        )
        .route(
            "/api/admin/profiles/approved",
            get(admin::handle_list_approved),
        )
        .route(
            "/api/admin/profiles/reported",
            get(admin::handle_list_reported),
        )
        .route(
            "/api/admin/profiles/pending/:id/approve",
            post(admin::handle_approve),
        )
        .route(
            "/api/admin/profiles/pending/:id/reject",
            post(admin::handle_reject),
        )
        .route(
            "/api/admin/profiles/reported/:id/dismiss",
            post(admin::handle_dismiss_report),
        )
        .route(
            "/api/admin/profiles/reported/:id/remove",
            post(admin::handle_remove_reported),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use std::io::{Cursor, Write};

    use crate::auth::provider::{AuthTokens, SignInOutcome};
    use crate::test_support::{
        get, json_request, send, test_app, upload, ScriptedIdentity, CONFIRMATION_CODE,
    };

    const DOCX_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    fn docx(xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    fn login(email: &str, password: &str) -> axum::http::Request<axum::body::Body> {
        json_request(
            "POST",
            "/api/login",
            json!({"email": email, "password": password}),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "talent-hub-api");
    }

    #[tokio::test]
    async fn test_created_user_reads_back_with_same_fields() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/users",
                json!({
                    "userID": "u-1",
                    "email": "alex@example.com",
                    "role": "Professional",
                    "fullName": "Alex Rivera",
                    "title": "Instructional Designer",
                    "location": "Wellington, NZ",
                    "linkedin": "https://linkedin.com/in/alex-rivera",
                    "region": "APAC"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User profile created successfully");

        let (status, user) = send(&app, get("/api/users?userID=u-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["userID"], "u-1");
        assert_eq!(user["email"], "alex@example.com");
        assert_eq!(user["role"], "Professional");
        assert_eq!(user["fullName"], "Alex Rivera");
        assert_eq!(user["title"], "Instructional Designer");
        assert_eq!(user["region"], "APAC");
        assert_eq!(user["contact"]["linkedin"], "https://linkedin.com/in/alex-rivera");

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                "/api/users",
                json!({"userID": "u-1", "email": "alex@example.com", "role": "Professional", "title": "Lead Designer"}),
            ),
        )
        .await;
        assert_eq!(body["message"], "User profile updated successfully");
        assert_eq!(body["user"]["title"], "Lead Designer");
    }

    #[tokio::test]
    async fn test_unknown_user_is_404_and_missing_id_is_400() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, get("/api/users?userID=nobody")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "User not found");

        let (status, body) = send(&app, get("/api/users")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            json_request("POST", "/api/users", json!({"email": "a@b.co", "role": "Employee"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_adding_same_favourite_twice_keeps_one() {
        let app = test_app(ScriptedIdentity::default());
        let job = json!({"jobId": "3", "title": "LMS Administrator"});
        for _ in 0..2 {
            let (status, _) = send(
                &app,
                json_request("POST", "/api/favourites", json!({"userID": "u-2", "job": job.clone()})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, get("/api/favourites?userID=u-2")).await;
        let favourites = body["favourites"].as_array().unwrap();
        assert_eq!(favourites.len(), 1);
        assert_eq!(favourites[0]["jobId"], "3");
        assert_eq!(favourites[0]["title"], "LMS Administrator");
    }

    #[tokio::test]
    async fn test_removing_absent_favourite_is_noop() {
        let app = test_app(ScriptedIdentity::default());
        send(
            &app,
            json_request(
                "POST",
                "/api/favourites",
                json!({"userID": "u-3", "job": {"jobId": "1"}}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request("DELETE", "/api/favourites", json!({"userID": "u-3", "jobId": "99"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favourites"].as_array().unwrap().len(), 1);

        let (_, body) = send(
            &app,
            json_request("DELETE", "/api/favourites", json!({"userID": "u-3", "jobId": "1"})),
        )
        .await;
        assert!(body["favourites"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favourites_for_unknown_user_are_empty() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, get("/api/favourites?userID=ghost")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favourites"], json!([]));
    }

    #[tokio::test]
    async fn test_unconfirmed_and_wrong_password_are_distinct() {
        let identity = ScriptedIdentity::default()
            .with_account("new@example.com", "Passw0rd!", false)
            .with_account("known@example.com", "Passw0rd!", true);
        let app = test_app(identity);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/login",
                json!({"email": "new@example.com", "password": "Passw0rd!"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "USER_NOT_CONFIRMED");
        assert_eq!(body["error"]["email"], "new@example.com");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/login",
                json!({"email": "known@example.com", "password": "wrong"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "NOT_AUTHORIZED");
    }

    #[tokio::test]
    async fn test_signup_confirm_login_session_flow() {
        let app = test_app(ScriptedIdentity::default());

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/signup",
                json!({
                    "firstName": "Aroha",
                    "lastName": "Ngata",
                    "email": "aroha@example.nz",
                    "password": "Passw0rd!"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userConfirmed"], false);
        assert_eq!(body["user"]["fullName"], "Aroha Ngata");
        assert_eq!(body["user"]["role"], "Employee");
        assert_eq!(body["user"]["region"], "New Zealand");
        let user_id = body["userID"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/confirm",
                json!({"email": "aroha@example.nz", "code": "000000"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/confirm",
                json!({"email": "aroha@example.nz", "code": CONFIRMATION_CODE}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, login) = send(
            &app,
            json_request(
                "POST",
                "/api/login",
                json!({"email": "aroha@example.nz", "password": "Passw0rd!"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["tokenType"], "Bearer");
        assert_eq!(login["expiresIn"], 3600);

        let request = axum::http::Request::builder()
            .uri("/api/session")
            .header(
                "authorization",
                format!("Bearer {}", login["idToken"].as_str().unwrap()),
            )
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, session) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["userID"], user_id);
        assert_eq!(session["fullName"], "Aroha Ngata");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/signup",
                json!({"name": "Aroha", "email": "aroha@example.nz", "password": "x"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "USERNAME_EXISTS");
    }

    #[tokio::test]
    async fn test_signup_requires_name_email_password() {
        let app = test_app(ScriptedIdentity::default());
        let (status, _) = send(
            &app,
            json_request("POST", "/api/signup", json!({"email": "x@y.z", "password": "p"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_challenge_is_409_with_challenge_name() {
        let identity = ScriptedIdentity::default()
            .with_account("lead@example.com", "Passw0rd!", true)
            .with_sign_in_outcome(SignInOutcome::Challenge("NEW_PASSWORD_REQUIRED".into()));
        let app = test_app(identity);

        let (status, body) = send(&app, login("lead@example.com", "Passw0rd!")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CHALLENGE_REQUIRED");
        assert_eq!(body["error"]["challenge"], "NEW_PASSWORD_REQUIRED");
    }

    #[tokio::test]
    async fn test_login_without_tokens_is_502() {
        let identity = ScriptedIdentity::default()
            .with_account("lead@example.com", "Passw0rd!", true)
            .with_sign_in_outcome(SignInOutcome::Authenticated(AuthTokens {
                refresh_token: Some("refresh-only".into()),
                ..AuthTokens::default()
            }));
        let app = test_app(identity);

        let (status, body) = send(&app, login("lead@example.com", "Passw0rd!")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "MISSING_TOKENS");
    }

    #[tokio::test]
    async fn test_unconfigured_identity_is_500() {
        let app = test_app(ScriptedIdentity::unconfigured());

        let (status, body) = send(&app, login("lead@example.com", "Passw0rd!")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "IDENTITY_NOT_CONFIGURED");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/signup",
                json!({"name": "Lead", "email": "lead@example.com", "password": "Passw0rd!"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "IDENTITY_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_resend_confirmation() {
        let identity =
            ScriptedIdentity::default().with_account("new@example.com", "Passw0rd!", false);
        let app = test_app(identity);

        let (status, body) =
            send(&app, json_request("POST", "/api/resend-confirmation", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/resend-confirmation",
                json!({"email": "new@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "A new confirmation code has been sent to your email."
        );
    }

    #[tokio::test]
    async fn test_resume_without_text_is_422() {
        let app = test_app(ScriptedIdentity::default());
        let bytes = docx("<w:document><w:body><w:p></w:p></w:body></w:document>");
        let (status, body) = send(&app, upload("cv.docx", DOCX_TYPE, &bytes)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_resume_docx_inflating_past_limit_is_422() {
        let mut xml = String::from("<w:document><w:body><w:p><w:t>");
        xml.push_str(&"a".repeat(1024 * 1024));
        xml.push_str("</w:t></w:p></w:body></w:document>");
        let bytes = docx(&xml);
        assert!(bytes.len() < 4096);

        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, upload("cv.docx", DOCX_TYPE, &bytes)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_resume_rejects_unsupported_type() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, upload("notes.txt", "text/plain", b"hello world")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn test_resume_rejects_oversized_upload() {
        let app = test_app(ScriptedIdentity::default());
        let mut big = b"%PDF-1.4\n".to_vec();
        big.resize(8 * 1024, b'a');
        let (status, _) = send(&app, upload("cv.pdf", "application/pdf", &big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_resume_docx_is_parsed() {
        let xml = "<w:document><w:body>\
            <w:p><w:r><w:t>Maria Santos</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Facilitator &amp; Coach</w:t></w:r></w:p>\
            <w:p><w:r><w:t>maria@example.tl</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Skills</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Facilitation, Coaching</w:t></w:r></w:p>\
            </w:body></w:document>";
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, upload("cv.docx", DOCX_TYPE, &docx(xml))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["name"], "Maria Santos");
        assert_eq!(body["data"]["headline"], "Facilitator & Coach");
        assert_eq!(body["data"]["email"], "maria@example.tl");
        assert_eq!(body["data"]["skills"], json!(["Facilitation", "Coaching"]));
    }

    #[tokio::test]
    async fn test_professionals_browse() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(&app, get("/api/professionals?search=wellington")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 6);
        assert_eq!(body["professionals"][0]["id"], "demo-1");

        let (_, body) = send(&app, get("/api/professionals/filters")).await;
        assert!(body["skills"].as_array().unwrap().contains(&json!("xAPI")));

        let (status, body) = send(&app, get("/api/professionals/demo-4")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Maria Santos");

        let (status, _) = send(&app, get("/api/professionals/demo-99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_talent_request_posting_and_interest() {
        let app = test_app(ScriptedIdentity::default());
        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/api/talent-requests",
                json!({
                    "title": "Compliance eLearning Refresh",
                    "companyName": "Harbour Bank",
                    "location": "Auckland, NZ",
                    "type": "Contract",
                    "budget": "$12,000",
                    "timeframe": "2 months",
                    "description": "Refresh six compliance modules and move them onto our new LMS platform.",
                    "companyDescription": "Harbour Bank is a regional bank serving Aotearoa.",
                    "companyWebsite": "https://harbourbank.example.nz",
                    "applicationMethod": "Platform",
                    "skills": ["Rise", "Rise"]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["posted"], "Just now");
        let id = created["id"].as_str().unwrap().to_string();

        let (_, list) = send(&app, get("/api/talent-requests?type=contract")).await;
        assert_eq!(list["talentRequests"][0]["id"], id.as_str());

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/talent-requests/{id}/interest"),
                json!({"name": "Sam", "email": "sam@example.com", "message": "I'd love to help with this."}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["message"].is_string());

        let (status, _) = send(
            &app,
            json_request("POST", "/api/talent-requests", json!({"title": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_approve_moves_profile() {
        let app = test_app(ScriptedIdentity::default());
        let (status, body) = send(
            &app,
            json_request("POST", "/api/admin/profiles/pending/2/approve", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["name"], "Jordan Lee");

        let (_, pending) = send(&app, get("/api/admin/profiles/pending")).await;
        assert_eq!(pending["profiles"].as_array().unwrap().len(), 2);

        let (_, approved) = send(&app, get("/api/admin/profiles/approved?search=jordan")).await;
        assert_eq!(approved["profiles"].as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            json_request("POST", "/api/admin/profiles/reported/9/dismiss", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
