mod common;

use fintutor::model::entity::{QuizProgress, QuizProgressUpsert};
use fintutor::progress::Pace;
use fintutor::web::AuthenticatedUser;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::common::{
    Action, Flow, model_manager, seed_course, setup_server, setup_test_db, signup_action,
    survey_action,
};

// The seeded pace-10 course has 9 questions per quiz, all with correct
// choice 0, and tolerates one mistake per quiz.

fn selections(wrong: usize) -> Vec<i32> {
    let mut v = vec![0i32; 9];
    for slot in v.iter_mut().take(wrong) {
        *slot = 1;
    }
    v
}

fn submit_action(quiz_number: i32, selections: Vec<i32>) -> Action {
    let path: &'static str = match quiz_number {
        1 => "/api/v1/quizzes/1/submit",
        2 => "/api/v1/quizzes/2/submit",
        3 => "/api/v1/quizzes/3/submit",
        4 => "/api/v1/quizzes/4/submit",
        _ => panic!("unexpected quiz number in test"),
    };
    Action::new("quiz_submit", "POST", path).with_body(json!({ "selections": selections }))
}

#[tokio::test]
async fn quiz_gating_flow_test() {
    let pool = setup_test_db().await;
    seed_course(&pool, Pace::Ten).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("learner@example.com", "Learner", "foobaz"))
        .step(survey_action("10 lessons").assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["pace"], 10);
        }))
        // only lesson 1 ships content at the start
        .step(
            Action::new("course_me", "GET", "/api/v1/courses/me").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                let lessons = v["lessons"].as_array().unwrap();
                assert_eq!(lessons.len(), 10);
                assert_eq!(lessons[0]["unlocked"], true);
                assert!(lessons[0]["content"].is_string());
                assert_eq!(lessons[1]["unlocked"], false);
                assert!(lessons[1].get("content").is_none());
            }),
        )
        // quiz 2 is locked until quiz 1 is passed
        .step(
            Action::new("quiz_get_locked", "GET", "/api/v1/quizzes/2")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(submit_action(2, selections(0)).with_expect(StatusCode::FORBIDDEN))
        // the quiz view never leaks the answer key
        .step(
            Action::new("quiz_get", "GET", "/api/v1/quizzes/1").assert_body(|body| {
                assert!(!body.contains("correct_index"));
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["state"], "unlocked");
                assert_eq!(v["questions"].as_array().unwrap().len(), 9);
            }),
        )
        // a perfect run passes quiz 1 and unlocks item 2
        .step(submit_action(1, selections(0)).assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["passed"], true);
            assert_eq!(v["correct_count"], 9);
            assert_eq!(v["progress"]["1"]["passed"], true);
        }))
        .step(
            Action::new("course_me", "GET", "/api/v1/courses/me").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                let lessons = v["lessons"].as_array().unwrap();
                assert_eq!(lessons[1]["unlocked"], true);
                assert!(lessons[1]["content"].is_string());
                assert_eq!(lessons[2]["unlocked"], false);
            }),
        )
        .step(
            Action::new("quiz_list", "GET", "/api/v1/quizzes/").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["pace"], 10);
                let quizzes = v["quizzes"].as_array().unwrap();
                assert_eq!(quizzes.len(), 10);
                assert_eq!(quizzes[0]["state"], "passed");
                assert_eq!(quizzes[1]["state"], "unlocked");
                assert_eq!(quizzes[2]["state"], "locked");
            }),
        )
        // two mistakes is one too many at pace 10
        .step(submit_action(2, selections(2)).assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["passed"], false);
            assert_eq!(v["correct_count"], 7);
        }))
        // a failed quiz stays open and item 3 stays locked
        .step(
            Action::new("quiz_get_failed", "GET", "/api/v1/quizzes/2").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["state"], "failed");
            }),
        )
        .step(submit_action(3, selections(0)).with_expect(StatusCode::FORBIDDEN))
        // one mistake is within the pass bar
        .step(submit_action(2, selections(1)).assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["passed"], true);
            assert_eq!(v["correct_count"], 8);
        }))
        // a passed quiz refuses resubmission
        .step(submit_action(1, selections(0)).with_expect(StatusCode::CONFLICT))
        // but shows the answer key for review
        .step(
            Action::new("quiz_review", "GET", "/api/v1/quizzes/1").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["state"], "passed");
                assert_eq!(v["review"]["correct_indices"].as_array().unwrap().len(), 9);
            }),
        )
        // quiz 4 is still out of reach
        .step(submit_action(4, selections(0)).with_expect(StatusCode::FORBIDDEN))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn quiz_submission_validation_test() {
    let pool = setup_test_db().await;
    seed_course(&pool, Pace::Ten).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("strict@example.com", "Strict", "foobaz"))
        .step(survey_action("10 lessons"))
        // too few selections
        .step(
            submit_action(1, vec![0, 0, 0])
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| assert!(body.contains("selections"))),
        )
        // a rejected submission writes nothing
        .step(
            Action::new("progress", "GET", "/api/v1/quizzes/progress").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert!(v.as_object().unwrap().is_empty());
            }),
        )
        // -1 marks "no answer" and never scores
        .step(submit_action(1, vec![-1; 9]).assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["correct_count"], 0);
            assert_eq!(v["passed"], false);
        }))
        // read-your-writes: the failed attempt is immediately visible
        .step(
            Action::new("progress", "GET", "/api/v1/quizzes/progress").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["1"]["passed"], false);
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn survey_pace_defaults_to_twenty_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("vague@example.com", "Vague", "foobaz"))
        // an answer with no digits falls back to the most granular course
        .step(survey_action("no idea, you pick").assert_body(|body| {
            let v: Value = serde_json::from_str(body).unwrap();
            assert_eq!(v["pace"], 20);
        }))
        // an unknown pace number is rejected
        .step(survey_action("42 lessons").with_expect(StatusCode::BAD_REQUEST))
        // retaking the survey overwrites the previous answers
        .step(survey_action("5 lessons"))
        .step(
            Action::new("survey_get", "GET", "/api/v1/survey/").assert_body(|body| {
                let v: Value = serde_json::from_str(body).unwrap();
                assert_eq!(v["pace"], 5);
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn progress_store_last_write_wins_test() {
    let pool = setup_test_db().await;
    let mm = model_manager(&pool);

    // a user row to satisfy the foreign key
    let user_id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, name, password_hash, role) VALUES ($1,$2,$3,$4,$5)")
        .bind(user_id)
        .bind("store@example.com")
        .bind("Store")
        .bind("x")
        .bind("user")
        .execute(&pool.pool)
        .await
        .unwrap();

    let actor = AuthenticatedUser::new(user_id, fintutor::web::UserRole::User);

    let first = QuizProgress::upsert(
        &mm,
        &actor,
        QuizProgressUpsert {
            user_id,
            quiz_number: 1,
            passed: true,
            answers: vec![0; 9],
            pace: 10,
        },
    )
    .await
    .unwrap();

    let second = QuizProgress::upsert(
        &mm,
        &actor,
        QuizProgressUpsert {
            user_id,
            quiz_number: 1,
            passed: false,
            answers: vec![-1; 9],
            pace: 10,
        },
    )
    .await
    .unwrap();

    // same slot, overwritten in place
    assert_eq!(first.id(), second.id());
    assert!(!second.passed());

    let map = QuizProgress::map_for_user(&mm, &actor).await.unwrap();
    assert_eq!(map.len(), 1);
    let entry = map.get(&1).unwrap();
    assert!(!entry.passed);
    assert_eq!(entry.answers, vec![-1; 9]);

    drop(pool);
}
