//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  content::{ContentKind, NewContent, TargetKind, TargetRef},
  document::{DocumentPayload, NewDocument, QualityStatus},
  notification::{NewNotification, NotificationKind},
  reaction::{ReactionKey, ReactionKind},
  store::{CampusStore, StoreError as _},
  user::{ActionKind, AwardOutcome, NewUser, PointAward, Role, User, UserStats},
  vote::{VoteKey, VoteValue},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser::new(name)).await.unwrap()
}

fn award(user_id: Uuid, action: ActionKind, subject_key: &str) -> PointAward {
  PointAward { user_id, action, subject_key: subject_key.into() }
}

fn payload(title: &str) -> DocumentPayload {
  DocumentPayload {
    title:       title.into(),
    description: Some(format!("{title} notes")),
    file_url:    format!("https://files.example.com/{title}.pdf"),
    file_type:   "application/pdf".into(),
    file_size:   2048,
  }
}

// ─── Users & awards ──────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let created = s
    .add_user(NewUser::new("Ada").with_role(Role::Moderator).with_points(100))
    .await
    .unwrap();
  assert_eq!(created.level, 2);

  let fetched = s.get_user(created.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.display_name, "Ada");
  assert_eq!(fetched.role, Role::Moderator);
  assert_eq!(fetched.stats(), UserStats { points: 100, level: 2 });

  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn apply_award_updates_points_and_level_together() {
  let s = store().await;
  let u = s.add_user(NewUser::new("Grace").with_points(90)).await.unwrap();

  let outcome = s
    .apply_award(award(u.user_id, ActionKind::Post, "post:1"))
    .await
    .unwrap();
  assert_eq!(outcome, AwardOutcome::Applied {
    before: UserStats { points: 90, level: 1 },
    after:  UserStats { points: 100, level: 2 },
  });

  let stored = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(stored.stats(), UserStats { points: 100, level: 2 });
}

#[tokio::test]
async fn apply_award_is_idempotent_per_subject() {
  let s = store().await;
  let u = user(&s, "Linus").await;

  let first = s
    .apply_award(award(u.user_id, ActionKind::Upload, "document:a"))
    .await
    .unwrap();
  assert!(matches!(first, AwardOutcome::Applied { .. }));

  let again = s
    .apply_award(award(u.user_id, ActionKind::Upload, "document:a"))
    .await
    .unwrap();
  assert_eq!(again, AwardOutcome::AlreadyAwarded);

  // Same action on a different subject still counts.
  s.apply_award(award(u.user_id, ActionKind::Upload, "document:b"))
    .await
    .unwrap();

  let stored = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(stored.points, 100);
}

#[tokio::test]
async fn apply_award_for_missing_user() {
  let s = store().await;
  let outcome = s
    .apply_award(award(Uuid::new_v4(), ActionKind::Reply, "comment:x"))
    .await
    .unwrap();
  assert_eq!(outcome, AwardOutcome::UserNotFound);
}

#[tokio::test]
async fn counts_beyond_i64_are_rejected_before_writing() {
  let s = store().await;

  let err = s
    .add_user(NewUser::new("Overflow").with_points(u64::MAX))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::OutOfRange { column: "points", value: u64::MAX }));

  let u = user(&s, "Uploader").await;
  let mut huge = payload("huge");
  huge.file_size = u64::MAX;
  let err = s
    .add_document(NewDocument { owner_id: u.user_id, payload: huge })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::OutOfRange { column: "file_size", .. }));
  assert!(!err.is_conflict());
}

#[tokio::test]
async fn concurrent_awards_do_not_lose_updates() {
  let s = store().await;
  let u = user(&s, "Barbara").await;

  let mut handles = Vec::new();
  for i in 0..20 {
    let s = s.clone();
    let id = u.user_id;
    handles.push(tokio::spawn(async move {
      s.apply_award(award(id, ActionKind::Post, &format!("post:{i}")))
        .await
        .unwrap()
    }));
  }
  for h in handles {
    h.await.unwrap();
  }

  let stored = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(stored.stats(), UserStats::from_points(200));
}

// ─── Content ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn target_owner_respects_kind() {
  let s = store().await;
  let u = user(&s, "Edsger").await;
  let post = s
    .add_content(NewContent {
      kind:      ContentKind::Post,
      owner_id:  u.user_id,
      parent_id: None,
      body:      "hello".into(),
    })
    .await
    .unwrap();

  let owner = s.target_owner(post.target()).await.unwrap();
  assert_eq!(owner, Some(u.user_id));

  let wrong_kind = TargetRef::new(TargetKind::Question, post.content_id);
  assert_eq!(s.target_owner(wrong_kind).await.unwrap(), None);
}

#[tokio::test]
async fn set_accepted_answer_returns_previous() {
  let s = store().await;
  let u = user(&s, "Alan").await;
  let question = s
    .add_content(NewContent {
      kind:      ContentKind::Question,
      owner_id:  u.user_id,
      parent_id: None,
      body:      "why?".into(),
    })
    .await
    .unwrap();
  let answer = |body: &str| NewContent {
    kind:      ContentKind::Answer,
    owner_id:  u.user_id,
    parent_id: Some(question.content_id),
    body:      body.into(),
  };
  let a1 = s.add_content(answer("because")).await.unwrap();
  let a2 = s.add_content(answer("because, really")).await.unwrap();

  let prev = s.set_accepted_answer(question.content_id, a1.content_id).await.unwrap();
  assert_eq!(prev, None);
  let prev = s.set_accepted_answer(question.content_id, a2.content_id).await.unwrap();
  assert_eq!(prev, Some(a1.content_id));

  let stored = s.get_content(question.content_id).await.unwrap().unwrap();
  assert_eq!(stored.accepted_answer_id, Some(a2.content_id));
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn revise_document_archives_previous_head() {
  let s = store().await;
  let u = user(&s, "Margaret").await;
  let doc = s
    .add_document(NewDocument { owner_id: u.user_id, payload: payload("v1") })
    .await
    .unwrap();
  s.set_quality_status(doc.document_id, QualityStatus::Verified)
    .await
    .unwrap()
    .unwrap();
  let before = s.get_document(doc.document_id).await.unwrap().unwrap();

  let rev = s.revise_document(doc.document_id, 1, payload("v2")).await.unwrap();

  assert_eq!(rev.head.document_id, doc.document_id);
  assert_eq!(rev.head.version, 2);
  assert_eq!(rev.head.quality_status, QualityStatus::Pending);
  assert_eq!(rev.head.payload, payload("v2"));
  assert_eq!(rev.head.parent_id, Some(rev.archived.document_id));
  assert!(rev.head.is_live());

  assert_eq!(rev.archived.head_id, Some(doc.document_id));
  assert_eq!(rev.archived.version, 1);
  assert_eq!(rev.archived.payload, before.payload);
  assert_eq!(rev.archived.quality_status, QualityStatus::Verified);
  assert_eq!(rev.archived.parent_id, None);
  assert_eq!(rev.archived.created_at, before.created_at);

  let history = s.document_history(doc.document_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].document_id, rev.archived.document_id);
}

#[tokio::test]
async fn revise_document_chains_parents() {
  let s = store().await;
  let u = user(&s, "Frances").await;
  let doc = s
    .add_document(NewDocument { owner_id: u.user_id, payload: payload("a") })
    .await
    .unwrap();

  let r2 = s.revise_document(doc.document_id, 1, payload("b")).await.unwrap();
  let r3 = s.revise_document(doc.document_id, 2, payload("c")).await.unwrap();

  assert_eq!(r3.head.version, 3);
  assert_eq!(r3.archived.parent_id, Some(r2.archived.document_id));

  let history = s.document_history(doc.document_id).await.unwrap();
  let versions: Vec<u32> = history.iter().map(|d| d.version).collect();
  assert_eq!(versions, vec![2, 1]);
}

#[tokio::test]
async fn revise_document_with_stale_version_conflicts() {
  let s = store().await;
  let u = user(&s, "Ken").await;
  let doc = s
    .add_document(NewDocument { owner_id: u.user_id, payload: payload("a") })
    .await
    .unwrap();
  s.revise_document(doc.document_id, 1, payload("b")).await.unwrap();

  let err = s
    .revise_document(doc.document_id, 1, payload("c"))
    .await
    .unwrap_err();
  assert!(err.is_conflict());

  // Nothing was archived by the losing attempt.
  assert_eq!(s.document_history(doc.document_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn revise_missing_document_errors() {
  let s = store().await;
  let err = s
    .revise_document(Uuid::new_v4(), 1, payload("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DocumentNotFound(_)));
}

#[tokio::test]
async fn archived_snapshots_cannot_be_reviewed() {
  let s = store().await;
  let u = user(&s, "Radia").await;
  let doc = s
    .add_document(NewDocument { owner_id: u.user_id, payload: payload("a") })
    .await
    .unwrap();
  let rev = s.revise_document(doc.document_id, 1, payload("b")).await.unwrap();

  let result = s
    .set_quality_status(rev.archived.document_id, QualityStatus::Rejected)
    .await
    .unwrap();
  assert!(result.is_none());

  // Archived snapshots are not reaction targets either.
  let target = TargetRef::new(TargetKind::Document, rev.archived.document_id);
  assert_eq!(s.target_owner(target).await.unwrap(), None);
}

// ─── Notifications ───────────────────────────────────────────────────────────

fn note(owner_id: Uuid, content: &str) -> NewNotification {
  NewNotification {
    owner_id,
    kind: NotificationKind::System,
    content: content.into(),
    link: None,
  }
}

#[tokio::test]
async fn notifications_listed_newest_first_and_bounded() {
  let s = store().await;
  let u = user(&s, "Donald").await;
  for i in 0..5 {
    s.add_notification(note(u.user_id, &format!("n{i}"))).await.unwrap();
  }

  let listed = s.list_notifications(u.user_id, 3).await.unwrap();
  let contents: Vec<&str> = listed.iter().map(|n| n.content.as_str()).collect();
  assert_eq!(contents, vec!["n4", "n3", "n2"]);
  assert!(listed.iter().all(|n| !n.is_read));
}

#[tokio::test]
async fn mark_read_requires_ownership() {
  let s = store().await;
  let owner = user(&s, "Owner").await;
  let other = user(&s, "Other").await;
  let n = s.add_notification(note(owner.user_id, "hi")).await.unwrap();

  assert!(!s.mark_notification_read(other.user_id, n.notification_id).await.unwrap());
  assert_eq!(s.unread_notifications(owner.user_id).await.unwrap(), 1);

  assert!(s.mark_notification_read(owner.user_id, n.notification_id).await.unwrap());
  assert_eq!(s.unread_notifications(owner.user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn mark_all_read_only_touches_owner() {
  let s = store().await;
  let a = user(&s, "A").await;
  let b = user(&s, "B").await;
  s.add_notification(note(a.user_id, "1")).await.unwrap();
  s.add_notification(note(a.user_id, "2")).await.unwrap();
  s.add_notification(note(b.user_id, "3")).await.unwrap();

  assert_eq!(s.mark_all_notifications_read(a.user_id).await.unwrap(), 2);
  assert_eq!(s.mark_all_notifications_read(a.user_id).await.unwrap(), 0);
  assert_eq!(s.unread_notifications(b.user_id).await.unwrap(), 1);
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_reaction_is_a_conflict() {
  let s = store().await;
  let u = user(&s, "Tony").await;
  let key = ReactionKey {
    reaction: ReactionKind::Like,
    actor_id: u.user_id,
    target:   TargetRef::new(TargetKind::Post, Uuid::new_v4()),
  };

  s.add_reaction(key).await.unwrap();
  let err = s.add_reaction(key).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
  assert!(err.is_conflict());

  assert_eq!(s.count_reactions(ReactionKind::Like, key.target).await.unwrap(), 1);
  assert_eq!(s.count_reactions(ReactionKind::Bookmark, key.target).await.unwrap(), 0);

  assert!(s.remove_reaction(key).await.unwrap());
  assert!(!s.remove_reaction(key).await.unwrap());
  assert!(s.get_reaction(key).await.unwrap().is_none());
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_vote_replaces_previous_value() {
  let s = store().await;
  let a = user(&s, "A").await;
  let b = user(&s, "B").await;
  let target = TargetRef::new(TargetKind::Answer, Uuid::new_v4());
  let key_a = VoteKey { actor_id: a.user_id, target };
  let key_b = VoteKey { actor_id: b.user_id, target };

  s.upsert_vote(key_a, VoteValue::Up).await.unwrap();
  s.upsert_vote(key_b, VoteValue::Up).await.unwrap();
  assert_eq!(s.score(target).await.unwrap(), 2);

  s.upsert_vote(key_a, VoteValue::Down).await.unwrap();
  assert_eq!(s.score(target).await.unwrap(), 0);
  assert_eq!(s.get_vote(key_a).await.unwrap().unwrap().value, VoteValue::Down);

  let empty = TargetRef::new(TargetKind::Answer, Uuid::new_v4());
  assert_eq!(s.score(empty).await.unwrap(), 0);
}

// ─── Conversations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn conversation_lookup_is_symmetric() {
  let s = store().await;
  let a = user(&s, "A").await;
  let b = user(&s, "B").await;

  assert!(s.find_conversation(a.user_id, b.user_id).await.unwrap().is_none());
  let created = s.add_conversation(b.user_id, a.user_id).await.unwrap();

  let ab = s.find_conversation(a.user_id, b.user_id).await.unwrap().unwrap();
  let ba = s.find_conversation(b.user_id, a.user_id).await.unwrap().unwrap();
  assert_eq!(ab.conversation_id, created.conversation_id);
  assert_eq!(ba.conversation_id, created.conversation_id);

  let err = s.add_conversation(a.user_id, b.user_id).await.unwrap_err();
  assert!(err.is_conflict());
}
