mod common;
use fintutor::model::entity::UserEntity;
use fintutor::web::middlewares::AUTH_TOKEN;
use reqwest::StatusCode;
use serde_json::json;
use tower_cookies::cookie::SameSite;

use crate::common::{Action, Flow, setup_server, setup_test_db, signin_action, signup_action};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("foo@example.com", "Foo Bar", "foobaz")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(ent.email(), "foo@example.com");
                    assert_eq!(ent.name(), "Foo Bar");
                })
                .with_expect(StatusCode::OK),
        )
        // try to signup twice
        .step(
            signup_action("foo@example.com", "Foo Bar", "foobaz")
                .with_expect(StatusCode::CONFLICT),
        )
        // email case does not create a second account
        .step(
            signup_action("FOO@EXAMPLE.COM", "Foo Bar", "foobaz")
                .with_expect(StatusCode::CONFLICT),
        )
        // malformed email
        .step(
            signup_action("not-an-email", "Foo Bar", "foobaz")
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("email"))),
        )
        // too short password
        .step(
            signup_action("short@example.com", "Shorty", "12345")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("signin@example.com", "Signin Test", "SIGNINTEST").with_save_cookies(false))
        .step(
            signin_action("signin@example.com", "SIGNINTEST")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(ent.email(), "signin@example.com");
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong credentials
        .step(
            signin_action("signin@example.com", "WRONGPASSWORD")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| {
                    assert!(body.contains("Authentication error"));
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // non-existing account
        .step(
            signin_action("nobody@example.com", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_list_requires_admin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("plain@example.com", "Plain", "foobaz").with_save_cookies(true))
        // a regular user cannot page through accounts
        .step(
            Action::new("user_list", "GET", "/api/v1/account/page")
                .assert_body(|body| {
                    assert!(body.contains("error"));
                })
                .with_param("limit", "5")
                .with_param("offset", "0")
                .with_expect(StatusCode::FORBIDDEN)
                .with_save_cookies(true),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_update_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        // create a pair of users and save their data to `first_user` and `second_user`
        .step(
            signup_action("first@example.com", "First", "foobaz")
                .with_save_cookies(false)
                .with_save_as("first_user"),
        )
        .step(
            signup_action("second@example.com", "Second", "foobaz")
                .with_save_cookies(true)
                .with_save_as("second_user"),
        )
        // try to update `first_user` without permissions
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    let user = ctx.get_json::<UserEntity>("first_user");
                    format!("/api/v1/account/{}", user.id())
                })
                .with_body(json!({
                    "email": "should.fail@example.com",
                    "name": "should fail",
                }))
                .with_expect(StatusCode::FORBIDDEN)
                .assert_body(|body| {
                    assert!(body.contains("error"));
                }),
        )
        // try to update self, this one should work
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    let user = ctx.get_json::<UserEntity>("second_user");
                    format!("/api/v1/account/{}", user.id())
                })
                .with_expect(StatusCode::OK)
                .with_body(json!({
                    "email": "renamed@example.com",
                    "name": "Renamed",
                }))
                .assert_body(|body| {
                    assert!(body.contains("renamed@example.com"));
                }),
        )
        // try to take over an existing user's email. This one should fail.
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    let user = ctx.get_json::<UserEntity>("second_user");
                    format!("/api/v1/account/{}", user.id())
                })
                .with_body(json!({
                    "email": "first@example.com",
                    "name": "Takeover",
                }))
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| {
                    assert!(body.contains("error"));
                }),
        )
        // keeping your own email is not a conflict
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| {
                    let user = ctx.get_json::<UserEntity>("second_user");
                    format!("/api/v1/account/{}", user.id())
                })
                .with_body(json!({
                    "email": "renamed@example.com",
                    "name": "Renamed Again",
                }))
                .with_expect(StatusCode::OK),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_delete_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("victim@example.com", "Victim", "foobaz")
                .with_save_cookies(false)
                .with_save_as("victim"),
        )
        .step(
            signup_action("actor@example.com", "Actor", "foobaz")
                .with_save_cookies(true)
                .with_save_as("actor"),
        )
        // we can't allow everybody to delete anybody ;D
        .step(
            Action::new("user_delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| {
                    let victim = ctx.get_json::<UserEntity>("victim");
                    format!("/api/v1/account/{}", victim.id())
                })
                .with_expect(StatusCode::FORBIDDEN)
                .assert_body(|body| {
                    assert!(body.contains("error"));
                }),
        )
        // self deletion is allowed
        .step(
            Action::new("user_delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| {
                    let actor = ctx.get_json::<UserEntity>("actor");
                    format!("/api/v1/account/{}", actor.id())
                })
                .with_expect(StatusCode::OK),
        )
        // the session died with the account
        .step(
            Action::new("user_delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| {
                    let victim = ctx.get_json::<UserEntity>("victim");
                    format!("/api/v1/account/{}", victim.id())
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}
