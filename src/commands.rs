use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use postblock::{
    application::{error::AppError, fetcher::FetchOutcome, script, session::EditorSession},
    config::{EditArgs, PreviewArgs, Settings},
    domain::{entities::BlockConfiguration, types::BlockType},
    infra::{error::InfraError, rest::RestContentSource},
};
use serde::Serialize;
use tracing::{info, warn};

pub async fn categories(settings: &Settings) -> Result<(), AppError> {
    let session = open_session(settings, BlockConfiguration::default())?;
    print_json(&session.load_catalog().await)
}

pub async fn preview(settings: &Settings, args: PreviewArgs) -> Result<(), AppError> {
    let config = BlockConfiguration {
        block_type: BlockType::Dynamic,
        ..Default::default()
    };
    let session = open_session(settings, config)?;
    let initial = session.initialize().await;

    let outcome = if args.categories.is_empty() {
        initial
    } else {
        for value in args.categories {
            session.select_category(value);
        }
        session
            .dispatch_selection_changes()
            .await
            .unwrap_or(initial)
    };

    if let FetchOutcome::Failed { error, .. } = outcome {
        return Err(AppError::unexpected(format!("preview fetch failed: {error}")));
    }
    print_json(&session.preview().posts)
}

pub async fn edit(settings: &Settings, args: EditArgs) -> Result<(), AppError> {
    let config = read_configuration(&args.file).await?;
    let session = open_session(settings, config)?;
    session.initialize().await;

    for action in &args.actions {
        script::apply(&session, action).await?;
    }

    let rendered = render(&session.configuration())?;
    match args.output {
        Some(path) => {
            tokio::fs::write(&path, rendered.as_bytes())
                .await
                .map_err(InfraError::from)?;
            info!(path = %path.display(), actions = args.actions.len(), "block configuration written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn open_session(settings: &Settings, config: BlockConfiguration) -> Result<EditorSession, AppError> {
    let source = RestContentSource::new(&settings.remote)?;
    Ok(EditorSession::new(Arc::new(source), config))
}

/// A missing file starts from the default attributes.
async fn read_configuration(path: &Path) -> Result<BlockConfiguration, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "block file not found; starting from defaults");
            return Ok(BlockConfiguration::default());
        }
        Err(err) => return Err(InfraError::from(err).into()),
    };
    serde_json::from_slice(&bytes).map_err(|err| {
        InfraError::configuration(format!("invalid block file {}: {err}", path.display())).into()
    })
}

fn render<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", render(value)?);
    Ok(())
}
