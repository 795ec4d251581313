use std::{io::Write, process, sync::Arc};

use folio::{
    application::{
        catalog::Catalog,
        enrichment::{EnrichmentSettings, GithubEnrichment, SystemClock},
        error::AppError,
        render::render_service,
    },
    config::{self, Command},
    infra::{fs::FsContentRepo, github::ReqwestTransport, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let catalog = build_catalog(&settings)?;

    info!(
        target = "folio::cli",
        content_root = %settings.content.root.display(),
        "Loaded configuration"
    );

    match cli_args.command {
        Command::Articles(args) => {
            let locale = args.locale.locale;
            let articles = match (args.tag.as_deref(), args.featured) {
                (Some(tag), featured) => catalog
                    .articles_by_tag(tag, locale)
                    .await
                    .into_iter()
                    .filter(|article| !featured || article.meta.featured)
                    .collect(),
                (None, true) => catalog.featured_articles(locale).await,
                (None, false) => catalog.articles(locale).await,
            };
            print_json(&articles)
        }
        Command::Article(args) => {
            let article = catalog
                .article(&args.slug, args.locale.locale)
                .await
                .ok_or_else(|| AppError::not_found(format!("article `{}`", args.slug)))?;
            print_json(&article)
        }
        Command::Tags(args) => print_json(&catalog.article_tags(args.locale).await),
        Command::Projects(args) => {
            let projects = if args.featured {
                catalog.featured_projects(args.locale.locale).await
            } else {
                catalog.projects(args.locale.locale).await
            };
            print_json(&projects)
        }
        Command::Project(args) => {
            let project = catalog
                .project(&args.slug, args.locale.locale)
                .await
                .ok_or_else(|| AppError::not_found(format!("project `{}`", args.slug)))?;
            print_json(&project)
        }
        Command::Commits(args) => {
            print_json(&catalog.enrichment().recent_commits(&args.account).await)
        }
        Command::Stars(args) => print_json(&catalog.enrichment().stars(&args.repo).await),
    }
}

fn build_catalog(settings: &config::Settings) -> Result<Catalog, AppError> {
    let clock = Arc::new(SystemClock);
    let transport = ReqwestTransport::new(&settings.github)?;
    let enrichment = GithubEnrichment::new(
        Arc::new(transport),
        clock.clone(),
        EnrichmentSettings::from(&settings.github),
    );

    Ok(Catalog::new(
        Arc::new(FsContentRepo::new(settings.content.root.clone())),
        render_service(),
        Arc::new(enrichment),
        clock,
    )
    .with_load_concurrency(settings.content.load_concurrency.get()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}
