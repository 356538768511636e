use clap::{Parser, Subcommand};
use fintutor::model::entity::{
    Course, CourseCreate, Lesson, LessonCreate, Quiz, QuizCreate, UserEntity,
    UserEntityCreateUpdate,
};
use fintutor::model::{CrudRepository, DbConnection, ModelManager, PaginatableRepository};
use fintutor::progress::{Pace, QuizQuestion};
use fintutor::web::AuthenticatedUser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage the course catalog
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

/// Course catalog management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    /// Import a generated course from a JSON file
    Import {
        /// Path to the generator output
        #[arg(long)]
        file: String,
    },
    /// List the catalog
    List,
}

/// The shape the offline course generator emits.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseFile {
    name: String,
    pace: i64,
    lessons: Vec<LessonFile>,
    quizzes: Vec<QuizFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonFile {
    lesson_number: i32,
    title: String,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizFile {
    quiz_number: i32,
    questions: Vec<QuestionFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionFile {
    question: String,
    choices: Vec<String>,
    correct_index: usize,
}

/// Rejects files that do not match the per-pace shape the engine expects.
fn validate_course(course: &CourseFile) -> Result<Pace, String> {
    let pace = Pace::try_from(course.pace).map_err(|e| e.to_string())?;

    if course.lessons.len() != pace.lesson_count() {
        return Err(format!(
            "pace {pace} expects {} lessons, file has {}",
            pace.lesson_count(),
            course.lessons.len()
        ));
    }
    if course.quizzes.len() != pace.quiz_count() {
        return Err(format!(
            "pace {pace} expects {} quizzes, file has {}",
            pace.quiz_count(),
            course.quizzes.len()
        ));
    }

    for quiz in &course.quizzes {
        if quiz.questions.len() != pace.questions_per_quiz() {
            return Err(format!(
                "quiz {} has {} questions, pace {pace} expects {}",
                quiz.quiz_number,
                quiz.questions.len(),
                pace.questions_per_quiz()
            ));
        }
        for question in &quiz.questions {
            if question.choices.len() != pace.choices_per_question() {
                return Err(format!(
                    "quiz {}: every question needs {} choices",
                    quiz.quiz_number,
                    pace.choices_per_question()
                ));
            }
            if question.choices.iter().any(|choice| choice.is_empty()) {
                return Err(format!("quiz {}: empty choice text", quiz.quiz_number));
            }
            if question.correct_index >= question.choices.len() {
                return Err(format!(
                    "quiz {}: correctIndex {} out of range",
                    quiz.quiz_number, question.correct_index
                ));
            }
        }
    }

    Ok(pace)
}

#[tokio::main]
async fn main() -> fintutor::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&std::env::var("DATABASE_URL").unwrap())?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                email,
                name,
                password,
            } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email: email.to_lowercase(),
                        name,
                        password_hash: fintutor::auth::hash_password(&password).unwrap(),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Import { file } => {
                let raw = std::fs::read_to_string(file)?;
                let course_file: CourseFile =
                    serde_json::from_str(&raw).map_err(fintutor::model::DatabaseError::from)?;

                let pace = match validate_course(&course_file) {
                    Ok(pace) => pace,
                    Err(reason) => {
                        eprintln!("Course file rejected: {reason}");
                        std::process::exit(1);
                    }
                };

                if Course::find_by_pace(&mm, &actor, pace.lesson_count() as i32)
                    .await?
                    .is_some()
                {
                    eprintln!("A course for pace {pace} already exists");
                    std::process::exit(1);
                }

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        name: course_file.name,
                        pace: pace.lesson_count() as i32,
                    },
                )
                .await?;

                for lesson in course_file.lessons {
                    Lesson::create(
                        &mm,
                        &actor,
                        LessonCreate {
                            course_id: course.id(),
                            lesson_number: lesson.lesson_number,
                            title: lesson.title,
                            content: lesson.content,
                        },
                    )
                    .await?;
                }

                for quiz in course_file.quizzes {
                    let questions = quiz
                        .questions
                        .into_iter()
                        .map(|q| QuizQuestion {
                            question: q.question,
                            choices: q.choices,
                            correct_index: q.correct_index,
                        })
                        .collect();

                    Quiz::create(
                        &mm,
                        &actor,
                        QuizCreate {
                            course_id: course.id(),
                            quiz_number: quiz.quiz_number,
                            questions,
                        },
                    )
                    .await?;
                }

                println!("Course imported: {:?}", course);
            }

            CourseCommands::List => {
                let page = Course::page(&mm, &actor, 100, 0).await?;
                for course in &page.items {
                    let quiz_count = Quiz::count_by_course(&mm, &actor, course.id()).await?;
                    println!(
                        "pace {:>2}  {}  ({} quizzes)",
                        course.pace(),
                        course.name(),
                        quiz_count
                    );
                }
            }
        },
    }

    Ok(())
}
