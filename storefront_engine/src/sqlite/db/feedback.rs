use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::Feedback;

pub(crate) async fn insert_feedback(
    user_id: i64,
    product_id: i64,
    rating: i64,
    review: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Feedback, sqlx::Error> {
    let feedback: Feedback = sqlx::query_as(
        r#"
            INSERT INTO feedback (user_id, product_id, rating, review)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(rating)
    .bind(review)
    .fetch_one(conn)
    .await?;
    debug!("⭐️ Feedback {} recorded for product #{product_id} by user #{user_id}", feedback.id);
    Ok(feedback)
}

/// Blanks the review text, scoped to the author. Returns `None` when the feedback does not exist or belongs to
/// another user; blanking an already blank review succeeds and changes nothing.
pub(crate) async fn clear_review_text(
    feedback_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Feedback>, sqlx::Error> {
    let feedback = sqlx::query_as("UPDATE feedback SET review = NULL WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(feedback_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(feedback)
}

pub(crate) async fn average_rating(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<f64>, sqlx::Error> {
    let average: Option<f64> = sqlx::query_scalar("SELECT AVG(rating) FROM feedback WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(conn)
        .await?;
    Ok(average)
}
