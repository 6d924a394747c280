//! [`SqliteStore`]: the SQLite implementation of [`CampusStore`].

use std::path::Path;

use campus_core::{
  content::{Content, NewContent, TargetKind, TargetRef},
  conversation::{Conversation, ordered_pair},
  document::{Document, DocumentPayload, NewDocument, QualityStatus, Revision},
  notification::{NewNotification, Notification},
  reaction::{Reaction, ReactionKey, ReactionKind},
  store::CampusStore,
  user::{AwardOutcome, NewUser, PointAward, User, UserStats},
  vote::{Vote, VoteKey, VoteValue},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    CONTENT_COLUMNS, CONVERSATION_COLUMNS, DOCUMENT_COLUMNS,
    NOTIFICATION_COLUMNS, RawContent, RawConversation, RawDocument,
    RawNotification, RawReaction, RawUser, RawVote, USER_COLUMNS, decode_uuid,
    encode_count, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// What happened inside the version-upload transaction.
enum RevisionStep {
  Missing,
  Stale(i64),
  Done(RawDocument, RawDocument),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A campus store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn document_by_id(&self, id: Uuid) -> Result<Option<Document>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = ?1"),
              rusqlite::params![id_str],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }
}

// ─── CampusStore impl ────────────────────────────────────────────────────────

impl CampusStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let stats = UserStats::from_points(input.points);
    let user = User {
      user_id:      Uuid::new_v4(),
      display_name: input.display_name,
      role:         input.role,
      points:       stats.points,
      level:        stats.level,
      created_at:   Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = user.display_name.clone();
    let role_str = user.role.as_ref().to_owned();
    let points   = encode_count("points", user.points)?;
    let level    = i64::from(user.level);
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, display_name, role, points, level, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, role_str, points, level, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn apply_award(&self, award: PointAward) -> Result<AwardOutcome> {
    let user_str   = encode_uuid(award.user_id);
    let action_str = award.action.as_ref().to_owned();
    let delta      = award.action.points();
    let delta_val  = encode_count("points", delta)?;
    let at_str     = encode_dt(Utc::now());

    // The ledger insert and the stats update share one immediate
    // transaction, so concurrent awards for the same user serialize here.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<(i64, i64)> = tx
          .query_row(
            "SELECT points, level FROM users WHERE user_id = ?1",
            rusqlite::params![user_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let Some((points, level)) = current else {
          return Ok(Ok(AwardOutcome::UserNotFound));
        };

        let inserted = tx.execute(
          "INSERT OR IGNORE INTO point_awards (user_id, action, subject_key, points, awarded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![user_str, action_str, award.subject_key, delta_val, at_str],
        )?;
        if inserted == 0 {
          return Ok(Ok(AwardOutcome::AlreadyAwarded));
        }

        let before = UserStats { points: points.max(0) as u64, level: level.max(1) as u32 };
        let after = before.with_delta(delta);
        // Dropping the transaction rolls the ledger row back.
        let after_points = match encode_count("points", after.points) {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "UPDATE users SET points = ?2, level = ?3 WHERE user_id = ?1",
          rusqlite::params![user_str, after_points, i64::from(after.level)],
        )?;
        tx.commit()?;

        Ok(Ok(AwardOutcome::Applied { before, after }))
      })
      .await??;

    Ok(outcome)
  }

  // ── Content ───────────────────────────────────────────────────────────────

  async fn add_content(&self, input: NewContent) -> Result<Content> {
    let content = Content {
      content_id:         Uuid::new_v4(),
      kind:               input.kind,
      owner_id:           input.owner_id,
      parent_id:          input.parent_id,
      body:               input.body,
      accepted_answer_id: None,
      created_at:         Utc::now(),
    };

    let id_str     = encode_uuid(content.content_id);
    let kind_str   = content.kind.as_ref().to_owned();
    let owner_str  = encode_uuid(content.owner_id);
    let parent_str = content.parent_id.map(encode_uuid);
    let body       = content.body.clone();
    let at_str     = encode_dt(content.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contents (content_id, kind, owner_id, parent_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, kind_str, owner_str, parent_str, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(content)
  }

  async fn get_content(&self, id: Uuid) -> Result<Option<Content>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE content_id = ?1"),
              rusqlite::params![id_str],
              RawContent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContent::into_content).transpose()
  }

  async fn target_owner(&self, target: TargetRef) -> Result<Option<Uuid>> {
    let id_str   = encode_uuid(target.id);
    let kind_str = target.kind.as_ref().to_owned();

    let owner: Option<String> = self
      .conn
      .call(move |conn| {
        let owner = if target.kind == TargetKind::Document {
          conn
            .query_row(
              "SELECT owner_id FROM documents
               WHERE document_id = ?1 AND head_id IS NULL",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?
        } else {
          conn
            .query_row(
              "SELECT owner_id FROM contents WHERE content_id = ?1 AND kind = ?2",
              rusqlite::params![id_str, kind_str],
              |r| r.get(0),
            )
            .optional()?
        };
        Ok(owner)
      })
      .await?;

    owner.as_deref().map(decode_uuid).transpose()
  }

  async fn set_accepted_answer(
    &self,
    question_id: Uuid,
    answer_id:   Uuid,
  ) -> Result<Option<Uuid>> {
    let question_str = encode_uuid(question_id);
    let answer_str   = encode_uuid(answer_id);

    let previous: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let previous: Option<String> = tx
          .query_row(
            "SELECT accepted_answer_id FROM contents
             WHERE content_id = ?1 AND kind = 'question'",
            rusqlite::params![question_str],
            |r| r.get(0),
          )
          .optional()?
          .flatten();
        tx.execute(
          "UPDATE contents SET accepted_answer_id = ?2
           WHERE content_id = ?1 AND kind = 'question'",
          rusqlite::params![question_str, answer_str],
        )?;
        tx.commit()?;
        Ok(previous)
      })
      .await?;

    previous.as_deref().map(decode_uuid).transpose()
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn add_document(&self, input: NewDocument) -> Result<Document> {
    let now = Utc::now();
    let document = Document {
      document_id:    Uuid::new_v4(),
      owner_id:       input.owner_id,
      payload:        input.payload,
      version:        1,
      parent_id:      None,
      head_id:        None,
      quality_status: QualityStatus::Pending,
      created_at:     now,
      updated_at:     now,
    };

    let id_str     = encode_uuid(document.document_id);
    let owner_str  = encode_uuid(document.owner_id);
    let payload    = document.payload.clone();
    let status_str = document.quality_status.as_ref().to_owned();
    let size_val   = encode_count("file_size", document.payload.file_size)?;
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (
             document_id, owner_id, title, description, file_url, file_type,
             file_size, version, quality_status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            owner_str,
            payload.title,
            payload.description,
            payload.file_url,
            payload.file_type,
            size_val,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(document)
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    self.document_by_id(id).await
  }

  async fn revise_document(
    &self,
    document_id:      Uuid,
    expected_version: u32,
    payload:          DocumentPayload,
  ) -> Result<Revision> {
    let id_str       = encode_uuid(document_id);
    let archived_str = encode_uuid(Uuid::new_v4());
    let expected     = i64::from(expected_version);
    let pending      = QualityStatus::Pending.as_ref().to_owned();
    let at_str       = encode_dt(Utc::now());
    let size_val     = encode_count("file_size", payload.file_size)?;

    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let select_sql =
          format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE document_id = ?1");

        let live: Option<RawDocument> = tx
          .query_row(
            &format!("{select_sql} AND head_id IS NULL"),
            rusqlite::params![id_str],
            RawDocument::from_row,
          )
          .optional()?;

        let Some(live) = live else {
          return Ok(RevisionStep::Missing);
        };
        if live.version != expected {
          return Ok(RevisionStep::Stale(live.version));
        }

        // Archive first: the snapshot takes every attribute of the current
        // head, including its own version, parent and review status.
        tx.execute(
          "INSERT INTO documents (
             document_id, owner_id, title, description, file_url, file_type,
             file_size, version, parent_id, head_id, quality_status,
             created_at, updated_at
           )
           SELECT ?2, owner_id, title, description, file_url, file_type,
                  file_size, version, parent_id, document_id, quality_status,
                  created_at, updated_at
           FROM documents WHERE document_id = ?1",
          rusqlite::params![id_str, archived_str],
        )?;

        let updated = tx.execute(
          "UPDATE documents
           SET title = ?3, description = ?4, file_url = ?5, file_type = ?6,
               file_size = ?7, version = version + 1, parent_id = ?8,
               quality_status = ?9, updated_at = ?10
           WHERE document_id = ?1 AND version = ?2 AND head_id IS NULL",
          rusqlite::params![
            id_str,
            expected,
            payload.title,
            payload.description,
            payload.file_url,
            payload.file_type,
            size_val,
            archived_str,
            pending,
            at_str,
          ],
        )?;
        if updated != 1 {
          // Dropping the transaction rolls the snapshot back.
          return Ok(RevisionStep::Stale(live.version));
        }

        let head = tx.query_row(&select_sql, rusqlite::params![id_str], RawDocument::from_row)?;
        let archived =
          tx.query_row(&select_sql, rusqlite::params![archived_str], RawDocument::from_row)?;
        tx.commit()?;

        Ok(RevisionStep::Done(head, archived))
      })
      .await?;

    match step {
      RevisionStep::Missing => Err(Error::DocumentNotFound(document_id)),
      RevisionStep::Stale(found) => Err(Error::Conflict(format!(
        "document {document_id} is at version {found}, expected {expected_version}"
      ))),
      RevisionStep::Done(head, archived) => Ok(Revision {
        head:     head.into_document()?,
        archived: archived.into_document()?,
      }),
    }
  }

  async fn set_quality_status(
    &self,
    document_id: Uuid,
    status:      QualityStatus,
  ) -> Result<Option<Document>> {
    let id_str     = encode_uuid(document_id);
    let status_str = status.as_ref().to_owned();
    let at_str     = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents SET quality_status = ?2, updated_at = ?3
           WHERE document_id = ?1 AND head_id IS NULL",
          rusqlite::params![id_str, status_str, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Ok(None);
    }
    self.document_by_id(document_id).await
  }

  async fn document_history(&self, document_id: Uuid) -> Result<Vec<Document>> {
    let id_str = encode_uuid(document_id);

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DOCUMENT_COLUMNS} FROM documents
           WHERE head_id = ?1 ORDER BY version DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      owner_id:        input.owner_id,
      kind:            input.kind,
      content:         input.content,
      link:            input.link,
      is_read:         false,
      created_at:      Utc::now(),
    };

    let id_str    = encode_uuid(notification.notification_id);
    let owner_str = encode_uuid(notification.owner_id);
    let kind_str  = notification.kind.as_ref().to_owned();
    let content   = notification.content.clone();
    let link      = notification.link.clone();
    let at_str    = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (notification_id, owner_id, kind, content, link, is_read, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
          rusqlite::params![id_str, owner_str, kind_str, content, link, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn list_notifications(
    &self,
    owner_id: Uuid,
    limit:    usize,
  ) -> Result<Vec<Notification>> {
    let owner_str = encode_uuid(owner_id);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        // rowid breaks ties between rows stamped in the same microsecond.
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE owner_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str, limit_val], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_notification_read(
    &self,
    owner_id:        Uuid,
    notification_id: Uuid,
  ) -> Result<bool> {
    let owner_str = encode_uuid(owner_id);
    let id_str    = encode_uuid(notification_id);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1
           WHERE notification_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(updated > 0)
  }

  async fn mark_all_notifications_read(&self, owner_id: Uuid) -> Result<u64> {
    let owner_str = encode_uuid(owner_id);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE owner_id = ?1 AND is_read = 0",
          rusqlite::params![owner_str],
        )?)
      })
      .await?;

    Ok(updated as u64)
  }

  async fn unread_notifications(&self, owner_id: Uuid) -> Result<u64> {
    let owner_str = encode_uuid(owner_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM notifications WHERE owner_id = ?1 AND is_read = 0",
          rusqlite::params![owner_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn get_reaction(&self, key: ReactionKey) -> Result<Option<Reaction>> {
    let reaction_str = key.reaction.as_ref().to_owned();
    let actor_str    = encode_uuid(key.actor_id);
    let kind_str     = key.target.kind.as_ref().to_owned();
    let target_str   = encode_uuid(key.target.id);

    let raw: Option<RawReaction> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT reaction, actor_id, target_kind, target_id, created_at
               FROM reactions
               WHERE reaction = ?1 AND actor_id = ?2 AND target_kind = ?3 AND target_id = ?4",
              rusqlite::params![reaction_str, actor_str, kind_str, target_str],
              |row| {
                Ok(RawReaction {
                  reaction:    row.get(0)?,
                  actor_id:    row.get(1)?,
                  target_kind: row.get(2)?,
                  target_id:   row.get(3)?,
                  created_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReaction::into_reaction).transpose()
  }

  async fn add_reaction(&self, key: ReactionKey) -> Result<Reaction> {
    let reaction = Reaction { key, created_at: Utc::now() };

    let reaction_str = key.reaction.as_ref().to_owned();
    let actor_str    = encode_uuid(key.actor_id);
    let kind_str     = key.target.kind.as_ref().to_owned();
    let target_str   = encode_uuid(key.target.id);
    let at_str       = encode_dt(reaction.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reactions (reaction, actor_id, target_kind, target_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![reaction_str, actor_str, kind_str, target_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| Error::from_insert(e, "reaction"))?;

    Ok(reaction)
  }

  async fn remove_reaction(&self, key: ReactionKey) -> Result<bool> {
    let reaction_str = key.reaction.as_ref().to_owned();
    let actor_str    = encode_uuid(key.actor_id);
    let kind_str     = key.target.kind.as_ref().to_owned();
    let target_str   = encode_uuid(key.target.id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM reactions
           WHERE reaction = ?1 AND actor_id = ?2 AND target_kind = ?3 AND target_id = ?4",
          rusqlite::params![reaction_str, actor_str, kind_str, target_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn count_reactions(
    &self,
    reaction: ReactionKind,
    target:   TargetRef,
  ) -> Result<u64> {
    let reaction_str = reaction.as_ref().to_owned();
    let kind_str     = target.kind.as_ref().to_owned();
    let target_str   = encode_uuid(target.id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM reactions
           WHERE reaction = ?1 AND target_kind = ?2 AND target_id = ?3",
          rusqlite::params![reaction_str, kind_str, target_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn upsert_vote(&self, key: VoteKey, value: VoteValue) -> Result<Vote> {
    let vote = Vote { key, value, updated_at: Utc::now() };

    let actor_str  = encode_uuid(key.actor_id);
    let kind_str   = key.target.kind.as_ref().to_owned();
    let target_str = encode_uuid(key.target.id);
    let value_int  = i64::from(value.as_i8());
    let at_str     = encode_dt(vote.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (actor_id, target_kind, target_id, value, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (actor_id, target_kind, target_id)
           DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![actor_str, kind_str, target_str, value_int, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(vote)
  }

  async fn get_vote(&self, key: VoteKey) -> Result<Option<Vote>> {
    let actor_str  = encode_uuid(key.actor_id);
    let kind_str   = key.target.kind.as_ref().to_owned();
    let target_str = encode_uuid(key.target.id);

    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT actor_id, target_kind, target_id, value, updated_at
               FROM votes
               WHERE actor_id = ?1 AND target_kind = ?2 AND target_id = ?3",
              rusqlite::params![actor_str, kind_str, target_str],
              |row| {
                Ok(RawVote {
                  actor_id:    row.get(0)?,
                  target_kind: row.get(1)?,
                  target_id:   row.get(2)?,
                  value:       row.get(3)?,
                  updated_at:  row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn score(&self, target: TargetRef) -> Result<i64> {
    let kind_str   = target.kind.as_ref().to_owned();
    let target_str = encode_uuid(target.id);

    let score: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(value), 0) FROM votes
           WHERE target_kind = ?1 AND target_id = ?2",
          rusqlite::params![kind_str, target_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(score)
  }

  // ── Conversations ─────────────────────────────────────────────────────────

  async fn find_conversation(&self, a: Uuid, b: Uuid) -> Result<Option<Conversation>> {
    let a_str = encode_uuid(a);
    let b_str = encode_uuid(b);

    let raw: Option<RawConversation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE (user_a = ?1 AND user_b = ?2) OR (user_a = ?2 AND user_b = ?1)
                 LIMIT 1"
              ),
              rusqlite::params![a_str, b_str],
              RawConversation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawConversation::into_conversation).transpose()
  }

  async fn add_conversation(&self, a: Uuid, b: Uuid) -> Result<Conversation> {
    let (user_a, user_b) = ordered_pair(a, b);
    let conversation = Conversation {
      conversation_id: Uuid::new_v4(),
      user_a,
      user_b,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(conversation.conversation_id);
    let a_str  = encode_uuid(user_a);
    let b_str  = encode_uuid(user_b);
    let at_str = encode_dt(conversation.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO conversations (conversation_id, user_a, user_b, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, a_str, b_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| Error::from_insert(e, "conversation"))?;

    Ok(conversation)
  }
}
