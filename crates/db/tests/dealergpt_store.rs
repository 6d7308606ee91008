//! Integration tests for the conversation, memory and insight repositories.

use chrono::{Duration, Utc};
use dealergpt_db::models::conversation::NewConversation;
use dealergpt_db::models::insight::CreateInsight;
use dealergpt_db::models::memory::SaveMemory;
use dealergpt_db::models::user::CreateUser;
use dealergpt_db::repositories::{ConversationRepo, InsightRepo, MemoryRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@dealer.test"),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: "manager".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn memory(key: &str, priority: &str) -> SaveMemory {
    SaveMemory {
        key: key.to_string(),
        entity_type: "vehicle".to_string(),
        entity_id: Some(42),
        data: json!({ "note": "customer asked about finance" }),
        tags: vec!["finance".to_string(), "bmw".to_string()],
        priority: Some(priority.to_string()),
        relevance_score: Some(0.5),
        expires_at: None,
    }
}

fn insight(insight_type: &str, target_users: Vec<i64>) -> CreateInsight {
    CreateInsight {
        insight_type: insight_type.to_string(),
        title: format!("{insight_type} title"),
        description: "description".to_string(),
        data: json!({}),
        priority: "high".to_string(),
        target_users,
        expires_at: Some(Utc::now() + Duration::days(7)),
    }
}

async fn backdate(pool: &PgPool, table: &str, id: i64, days: i64) {
    sqlx::query(&format!(
        "UPDATE {table} SET created_at = NOW() - ($2 * INTERVAL '1 day') WHERE id = $1"
    ))
    .bind(id)
    .bind(days as f64)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn memory_upsert_overwrites_by_key(pool: PgPool) {
    let author = seed_user(&pool, "author").await;
    let first = MemoryRepo::upsert(&pool, &memory("vehicle:42", "medium"), Some(author))
        .await
        .unwrap();

    let mut second_input = memory("vehicle:42", "high");
    second_input.data = json!({ "note": "deposit taken" });
    let second = MemoryRepo::upsert(&pool, &second_input, None).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.priority, "high");
    assert_eq!(second.data, json!({ "note": "deposit taken" }));
    assert_eq!(second.created_by, Some(author));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dealergpt_memory")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn memory_search_matches_key_type_and_tags(pool: PgPool) {
    MemoryRepo::upsert(&pool, &memory("vehicle:42", "medium"), None)
        .await
        .unwrap();
    let mut other = memory("customer:7", "medium");
    other.entity_type = "customer".to_string();
    other.tags = vec!["repeat".to_string()];
    other.relevance_score = Some(0.9);
    MemoryRepo::upsert(&pool, &other, None).await.unwrap();

    let by_tag = MemoryRepo::search(&pool, "FINANCE", 10).await.unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].key, "vehicle:42");

    let by_key = MemoryRepo::search(&pool, ":", 10).await.unwrap();
    assert_eq!(by_key.len(), 2);
    assert_eq!(by_key[0].key, "customer:7", "higher relevance first");

    assert!(MemoryRepo::search(&pool, "%", 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_memory_is_hidden(pool: PgPool) {
    let mut entry = memory("temp", "medium");
    entry.expires_at = Some(Utc::now() - Duration::minutes(1));
    MemoryRepo::upsert(&pool, &entry, None).await.unwrap();

    assert!(MemoryRepo::find_by_key(&pool, "temp").await.unwrap().is_none());
    assert!(MemoryRepo::list_recent(&pool, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn prune_removes_only_old_low_priority_memory(pool: PgPool) {
    let low = MemoryRepo::upsert(&pool, &memory("old-low", "low"), None)
        .await
        .unwrap();
    let high = MemoryRepo::upsert(&pool, &memory("old-high", "high"), None)
        .await
        .unwrap();
    MemoryRepo::upsert(&pool, &memory("new-low", "low"), None)
        .await
        .unwrap();
    backdate(&pool, "dealergpt_memory", low.id, 91).await;
    backdate(&pool, "dealergpt_memory", high.id, 91).await;

    let removed = MemoryRepo::prune(&pool, Utc::now() - Duration::days(90))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(MemoryRepo::find_by_key(&pool, "old-low").await.unwrap().is_none());
    assert!(MemoryRepo::find_by_key(&pool, "old-high").await.unwrap().is_some());
    assert!(MemoryRepo::find_by_key(&pool, "new-low").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_insights_respect_targeting_expiry_and_acknowledgement(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;

    let broadcast = InsightRepo::create(&pool, &insight("aged_stock", vec![]))
        .await
        .unwrap();
    InsightRepo::create(&pool, &insight("hot_leads", vec![bob]))
        .await
        .unwrap();
    let mut expired = insight("low_stock", vec![]);
    expired.expires_at = Some(Utc::now() - Duration::hours(1));
    InsightRepo::create(&pool, &expired).await.unwrap();

    let for_alice = InsightRepo::list_active_for_user(&pool, alice, 10).await.unwrap();
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].id, broadcast.id);

    let for_bob = InsightRepo::list_active_for_user(&pool, bob, 10).await.unwrap();
    assert_eq!(for_bob.len(), 2);

    assert!(InsightRepo::acknowledge(&pool, broadcast.id, alice).await.unwrap());
    let for_alice = InsightRepo::list_active_for_user(&pool, alice, 10).await.unwrap();
    assert!(for_alice.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acknowledge_is_idempotent(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let row = InsightRepo::create(&pool, &insight("aged_stock", vec![]))
        .await
        .unwrap();

    assert!(InsightRepo::acknowledge(&pool, row.id, alice).await.unwrap());
    assert!(!InsightRepo::acknowledge(&pool, row.id, bob).await.unwrap());

    let stored = InsightRepo::find_by_id(&pool, row.id).await.unwrap().unwrap();
    assert!(stored.is_acknowledged);
    assert_eq!(stored.acknowledged_by, Some(alice));
    assert!(stored.acknowledged_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_types_excludes_acknowledged(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let aged = InsightRepo::create(&pool, &insight("aged_stock", vec![]))
        .await
        .unwrap();
    InsightRepo::create(&pool, &insight("hot_leads", vec![]))
        .await
        .unwrap();
    InsightRepo::acknowledge(&pool, aged.id, alice).await.unwrap();

    assert_eq!(
        InsightRepo::active_types(&pool).await.unwrap(),
        vec!["hot_leads".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn conversation_history_is_scoped_and_newest_first(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;

    let turns = [(alice, "s1", 1), (alice, "s1", 2), (alice, "s2", 3), (bob, "s1", 4)];
    for (user, session, n) in turns {
        ConversationRepo::create(
            &pool,
            &NewConversation {
                user_id: user,
                session_id: session.to_string(),
                message: format!("question {n}"),
                response: format!("answer {n}"),
                context_used: vec!["sales_data".to_string()],
                response_time_ms: 120,
            },
        )
        .await
        .unwrap();
    }

    let s1 = ConversationRepo::list_recent(&pool, alice, Some("s1"), 10)
        .await
        .unwrap();
    let messages: Vec<&str> = s1.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["question 2", "question 1"]);
    assert_eq!(s1[0].context_used, vec!["sales_data".to_string()]);

    let all = ConversationRepo::list_recent(&pool, alice, None, 10).await.unwrap();
    assert_eq!(all.len(), 3);

    let limited = ConversationRepo::list_recent(&pool, alice, None, 1).await.unwrap();
    assert_eq!(limited[0].message, "question 3");

    backdate(&pool, "dealergpt_conversations", all[2].id, 100).await;
    let removed = ConversationRepo::delete_older_than(&pool, Utc::now() - Duration::days(90))
        .await
        .unwrap();
    assert_eq!(removed, 1);
}
