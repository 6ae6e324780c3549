//! Database-backed checks of the write-path invariants: idempotent social
//! edges, forced authorship, and rejected uploads leaving no trace. Each
//! test gets its own freshly migrated database from `#[sqlx::test]`.
//!
//! Redis is deliberately unreachable here: cache failures must degrade, not
//! fail the writes under test.

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat};
use sqlx::PgPool;
use std::io::Cursor;
use uuid::Uuid;

use pulse_service::cache::PageCache;
use pulse_service::error::AppError;
use pulse_service::forms::{CommentForm, ImageUpload, PostForm};
use pulse_service::media::MediaStore;
use pulse_service::metrics::PAGE_CACHE_EVENTS;
use pulse_service::services::{CommentService, PostService, SocialService};

async fn seed_user(pool: &PgPool, username: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("seed user")
}

fn unreachable_cache() -> PageCache {
    let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
    PageCache::new(client, 20)
}

fn temp_media() -> (MediaStore, std::path::PathBuf) {
    let root = std::env::temp_dir().join(format!("pulse-props-{}", Uuid::new_v4()));
    (MediaStore::new(&root), root)
}

fn text_post(text: &str) -> PostForm {
    PostForm {
        text: text.into(),
        group: None,
        image: None,
    }
}

fn png_upload() -> ImageUpload {
    let img = DynamicImage::new_rgb8(4, 4);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    ImageUpload {
        content: general_purpose::STANDARD.encode(buf.into_inner()),
    }
}

async fn follow_count(pool: &PgPool, user: Uuid, author: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user)
        .bind(author)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn double_follow_leaves_one_row(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let social = SocialService::new(pool.clone());

    social.follow(alice, "bob").await.unwrap();
    // Repeating the toggle is success, not an error, and adds nothing.
    social.follow(alice, "bob").await.unwrap();

    assert_eq!(follow_count(&pool, alice, bob).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn unfollow_without_a_pair_is_a_noop(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let _bob = seed_user(&pool, "bob").await;
    let social = SocialService::new(pool.clone());

    social.unfollow(alice, "bob").await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn authorship_comes_from_the_acting_identity(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let (media, root) = temp_media();
    let posts = PostService::new(pool.clone(), unreachable_cache(), media);
    let comments = CommentService::new(pool.clone(), unreachable_cache());

    let post = posts.create_post(alice, &text_post("hello")).await.unwrap();
    let author_id: Uuid = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
        .bind(post.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(author_id, alice);

    let comment = comments
        .add_comment(post.id, alice, "alice", &CommentForm { text: "hi".into() })
        .await
        .unwrap();
    assert_eq!(comment.author_id, alice);

    std::fs::remove_dir_all(&root).ok();
}

#[sqlx::test(migrations = "./migrations")]
async fn rejected_upload_persists_no_row(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let (media, root) = temp_media();
    let posts = PostService::new(pool.clone(), unreachable_cache(), media);

    let form = PostForm {
        text: "with attachment".into(),
        group: None,
        image: Some(ImageUpload {
            content: general_purpose::STANDARD.encode(b"definitely not an image"),
        }),
    };
    let err = posts.create_post(alice, &form).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);

    std::fs::remove_dir_all(&root).ok();
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_insert_discards_stored_files(pool: PgPool) {
    let (media, root) = temp_media();
    let posts = PostService::new(pool.clone(), unreachable_cache(), media);

    let form = PostForm {
        text: "orphan candidate".into(),
        group: None,
        image: Some(png_upload()),
    };
    // Unknown author violates the FK after the files were written.
    let err = posts.create_post(Uuid::new_v4(), &form).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let leftovers = std::fs::read_dir(root.join("posts"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
    let renditions = std::fs::read_dir(root.join("renditions"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(renditions, 0);

    std::fs::remove_dir_all(&root).ok();
}

#[sqlx::test(migrations = "./migrations")]
async fn comment_deletion_invalidates_the_page_cache(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let (media, root) = temp_media();
    let posts = PostService::new(pool.clone(), unreachable_cache(), media);
    let comments = CommentService::new(pool.clone(), unreachable_cache());

    let post = posts.create_post(alice, &text_post("hello")).await.unwrap();
    let comment = comments
        .add_comment(post.id, alice, "alice", &CommentForm { text: "hi".into() })
        .await
        .unwrap();

    let bumps_before = PAGE_CACHE_EVENTS.with_label_values(&["invalidate"]).get();
    comments
        .delete_comment(post.id, comment.id, alice)
        .await
        .unwrap();
    let bumps_after = PAGE_CACHE_EVENTS.with_label_values(&["invalidate"]).get();

    // Feed pages render comment counts, so removal must bump the generation
    // like creation does.
    assert!(bumps_after > bumps_before);

    std::fs::remove_dir_all(&root).ok();
}
