//! Subcommands and their mapping onto engine calls.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use campus_core::{
  Entity, Error,
  content::{TargetKind, TargetRef},
  document::{DocumentPayload, QualityStatus},
  reaction::ReactionKind,
  store::CampusStore as _,
  user::{NewUser, Role},
};
use campus_engine::{Engine, EngineConfig};
use campus_store_sqlite::SqliteStore;
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create or inspect users.
  #[command(subcommand)]
  User(UserCommand),

  /// Publish a post.
  Post { user: Uuid, body: String },

  /// Comment on a post.
  Comment { user: Uuid, post: Uuid, body: String },

  /// Ask a question.
  Ask { user: Uuid, body: String },

  /// Answer a question.
  Answer { user: Uuid, question: Uuid, body: String },

  /// Accept an answer on behalf of the question's author or a moderator.
  Accept { requester: Uuid, question: Uuid, answer: Uuid },

  /// Upload the first version of a document.
  Upload {
    user: Uuid,
    #[command(flatten)]
    file: FileArgs,
  },

  /// Upload a new version of a document.
  Revise {
    user:     Uuid,
    document: Uuid,
    #[command(flatten)]
    file:     FileArgs,
  },

  /// Record a review outcome (VERIFIED, FLAGGED or REJECTED).
  Review {
    reviewer: Uuid,
    document: Uuid,
    status:   QualityStatus,
  },

  /// List the archived versions of a document, newest first.
  History { document: Uuid },

  /// Toggle a like or bookmark.
  React {
    user:     Uuid,
    reaction: ReactionKind,
    kind:     TargetKind,
    target:   Uuid,
  },

  /// Vote -1 or +1 on a target.
  Vote {
    user:   Uuid,
    kind:   TargetKind,
    target: Uuid,
    #[arg(allow_negative_numbers = true)]
    value:  i64,
  },

  /// Record a daily visit (today unless `--day` is given).
  Visit {
    user: Uuid,
    #[arg(long)]
    day:  Option<NaiveDate>,
  },

  #[command(subcommand)]
  Notifications(NotificationCommand),

  /// Find or start the conversation between two users.
  Conversation { a: Uuid, b: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
  Add {
    name:   String,
    #[arg(long, default_value = "user")]
    role:   Role,
    #[arg(long, default_value_t = 0)]
    points: u64,
  },
  Show {
    user: Uuid,
  },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
  /// Most recent notifications, newest first.
  List { user: Uuid },
  /// Mark one notification read.
  Read { user: Uuid, notification: Uuid },
  /// Mark every notification read.
  ReadAll { user: Uuid },
}

#[derive(Args, Debug)]
pub struct FileArgs {
  #[arg(long)]
  title:       String,
  #[arg(long)]
  description: Option<String>,
  #[arg(long)]
  file_url:    String,
  #[arg(long)]
  file_type:   String,
  #[arg(long)]
  file_size:   u64,
}

impl From<FileArgs> for DocumentPayload {
  fn from(args: FileArgs) -> Self {
    Self {
      title:       args.title,
      description: args.description,
      file_url:    args.file_url,
      file_type:   args.file_type,
      file_size:   args.file_size,
    }
  }
}

fn to_json(value: impl serde::Serialize) -> Result<Value> {
  serde_json::to_value(value).context("failed to encode result")
}

/// Run one command and return its JSON result.
pub async fn run(command: Command, store: SqliteStore, config: EngineConfig) -> Result<Value> {
  let engine = Engine::new(Arc::new(store), config);
  let store = engine.store();

  match command {
    Command::User(UserCommand::Add { name, role, points }) => {
      let user = store
        .add_user(NewUser::new(name).with_role(role).with_points(points))
        .await
        .context("failed to add user")?;
      to_json(user)
    }
    Command::User(UserCommand::Show { user }) => {
      let found = store
        .get_user(user)
        .await
        .context("failed to load user")?
        .ok_or_else(|| Error::not_found(Entity::User, user))?;
      to_json(found)
    }
    Command::Post { user, body } => to_json(engine.actions.create_post(user, body).await?),
    Command::Comment { user, post, body } => {
      to_json(engine.actions.add_comment(user, post, body).await?)
    }
    Command::Ask { user, body } => to_json(engine.actions.ask_question(user, body).await?),
    Command::Answer { user, question, body } => {
      to_json(engine.actions.post_answer(user, question, body).await?)
    }
    Command::Accept { requester, question, answer } => {
      to_json(engine.votes.accept_answer(question, answer, requester).await?)
    }
    Command::Upload { user, file } => {
      to_json(engine.actions.upload_document(user, file.into()).await?)
    }
    Command::Revise { user, document, file } => {
      to_json(engine.lifecycle.create_version(user, document, file.into()).await?)
    }
    Command::Review { reviewer, document, status } => {
      let reviewer = store
        .get_user(reviewer)
        .await
        .context("failed to load reviewer")?
        .ok_or_else(|| Error::not_found(Entity::User, reviewer))?;
      to_json(
        engine
          .lifecycle
          .update_status(document, status, reviewer.role)
          .await?,
      )
    }
    Command::History { document } => to_json(engine.lifecycle.history(document).await?),
    Command::React { user, reaction, kind, target } => {
      let target = TargetRef::new(kind, target);
      to_json(engine.reactions.toggle(user, reaction, target).await?)
    }
    Command::Vote { user, kind, target, value } => {
      let target = TargetRef::new(kind, target);
      to_json(engine.votes.vote(user, target, value).await?)
    }
    Command::Visit { user, day } => {
      let day = day.unwrap_or_else(|| Utc::now().date_naive());
      engine.actions.record_daily_visit(user, day).await?;
      let stats = store
        .get_user(user)
        .await
        .context("failed to load user")?
        .map(|u| u.stats());
      Ok(json!({ "user_id": user, "day": day, "stats": stats }))
    }
    Command::Notifications(NotificationCommand::List { user }) => {
      let unread = engine.notifications.unread_count(user).await?;
      let items = engine.notifications.list(user).await?;
      Ok(json!({ "unread": unread, "notifications": items }))
    }
    Command::Notifications(NotificationCommand::Read { user, notification }) => {
      let matched = engine.notifications.mark_read(user, notification).await?;
      Ok(json!({ "marked": matched }))
    }
    Command::Notifications(NotificationCommand::ReadAll { user }) => {
      let marked = engine.notifications.mark_all_read(user).await?;
      Ok(json!({ "marked": marked }))
    }
    Command::Conversation { a, b } => to_json(engine.conversations.resolve(a, b).await?),
  }
}
