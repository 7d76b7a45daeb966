use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use wiki_core::app::{App, AppBuilder, RequestContext};
use wiki_core::config::WikiConfig;
use wiki_core::domain::{
    ArticleContent, ArticleDraft, Author, Category, NewRepo, NewTeam, ProfileUpdate, RepoStatus,
    TeamStatus,
};
use wiki_core::impls::{
    DEFAULT_CATEGORY_ID, InMemoryBlobStore, InMemoryCache, InMemoryRelationalStore,
};
use wiki_core::ports::StoreError;

#[derive(Parser, Debug)]
#[command(name = "wiki", about = "Runs the hi-wiki storage core against in-memory stores")]
struct Args {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "wiki.toml")]
    config: PathBuf,

    /// Make the plain-text blob write fail once to show compensation
    #[arg(long)]
    fail_plain_write: bool,

    /// Per-request deadline in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2_000)]
    deadline_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = WikiConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from '{}'", args.config.display()))?;

    let blobs = Arc::new(InMemoryBlobStore::new());
    let app = AppBuilder::new()
        .config(config)
        .blob_store(blobs.clone())
        .cache(Arc::new(InMemoryCache::new()))
        .relational(Arc::new(InMemoryRelationalStore::new()))
        .build()
        .context("Failed to build application")?;

    if args.fail_plain_write {
        blobs.faults().fail_next_on(
            "put",
            &app.config.blob.puretext_prefix,
            StoreError::Unavailable("injected plain-text write failure".to_string()),
        );
    }

    let deadline = std::time::Duration::from_millis(args.deadline_ms);
    run_demo(&app, deadline).await?;

    app.tasks.wait_idle().await;
    println!("blobs stored: {}", blobs.len().await);
    Ok(())
}

/// チーム・知識庫・記事を作り、読み戻してからプロフィールを更新する
async fn run_demo(app: &App, deadline: std::time::Duration) -> Result<()> {
    let ctx = RequestContext::with_timeout(deadline);

    let uid = app.users.register(&ctx, "kamo", "opaque-hash").await?;
    tracing::info!(uid, "Registered demo user");

    let team = app
        .teams
        .create(
            &ctx,
            &NewTeam {
                name: "docs".to_string(),
                desc: "documentation team".to_string(),
                status: TeamStatus::AllAvailable,
                avatar_md5: String::new(),
            },
            uid,
        )
        .await?;
    let members = app.teams.get_members(&ctx, &team).await?;
    println!("team {team} has {} member(s)", members.len());

    let category = Category {
        id: DEFAULT_CATEGORY_ID,
        name: "default".to_string(),
    };
    let repo = app
        .repos
        .create(
            &ctx,
            NewRepo {
                name: "handbook".to_string(),
                desc: "how we work".to_string(),
                status: RepoStatus::Public,
                category: category.clone(),
                is_doc: true,
                team_id: 0,
                creator_id: uid,
            },
        )
        .await?;
    println!("repo {}", repo.unique_code);

    let author = Author {
        id: uid,
        ..Author::default()
    };
    let mut draft = ArticleDraft {
        unique_code: String::new(),
        title: "Getting started".to_string(),
        content: ArticleContent::new("<h1>Welcome</h1>", "Welcome"),
        repo_code: repo.unique_code.clone(),
        author,
        category,
        state: 0,
        private: false,
    };

    let code = match app.articles.edit(&ctx, draft.clone()).await {
        Ok(code) => code,
        Err(e) => {
            // 補償の結果を見せるため、失敗はログに残して続ける
            tracing::warn!(error = %e, code = e.code(), "Article creation failed");
            app.tasks.wait_idle().await;
            app.articles.edit(&ctx, draft.clone()).await?
        }
    };
    println!("article {code}");

    draft.unique_code = code.to_string();
    draft.title = "Getting started (edited)".to_string();
    draft.content = ArticleContent::new("<h1>Welcome aboard</h1>", "Welcome aboard");
    app.articles.edit(&ctx, draft).await?;

    let article = app.articles.detail(&ctx, &code).await?;
    println!(
        "{} by {} ({}) at {}",
        article.record.title,
        article.record.author.name,
        article.record.author.avatar_url(),
        article.formatted_created_at()
    );
    println!("{}", serde_json::to_string_pretty(&article)?);

    app.goods.like(&ctx, &code, uid).await?;
    let hot = app.articles.list_all(&ctx, true, 0, 10).await?;
    if let Some(top) = hot.items.first() {
        println!("hottest: {} ({} like(s))", top.record.title, top.record.like_cnt);
    }

    app.users
        .update_profile(
            &ctx,
            uid,
            &ProfileUpdate {
                avatar_md5: String::new(),
                profile: "writes the handbook".to_string(),
            },
        )
        .await?;
    let user = app.users.profile(&ctx, uid).await?;
    println!("profile: {}", user.profile);

    Ok(())
}
