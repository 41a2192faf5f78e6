//! reviewfeed - Entry Point
//!
//! Pages through a review payload the way a scrolling list would, then prints
//! every row with its measured height.

use clap::Parser;
use reviewfeed::config;
use reviewfeed::fetch::FetchController;
use reviewfeed::image::{
    HttpTransport, ImageCache, ImageSlots, RoutingTransport, SlotId, SlotImage,
};
use reviewfeed::layout::LayoutEngine;
use reviewfeed::model::{AppError, DisplayItem, ImageError, StarRatingRenderer};
use reviewfeed::presentation::{FeedListModel, FeedPresenter, ScrollMetrics};
use reviewfeed::source::file::DEFAULT_PAYLOAD_PATH;
use reviewfeed::source::FileSource;
use std::cell::RefCell;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
const IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// reviewfeed - headless driver for the paginated review feed
#[derive(Parser, Debug)]
#[command(name = "reviewfeed")]
#[command(version)]
#[command(about = "Page through a review payload and print the measured feed")]
pub struct Args {
    /// Path to the JSON review payload, resolved against the current
    /// directory [default: the payload bundled under assets/, when run from
    /// the repository root]
    #[arg(default_value = DEFAULT_PAYLOAD_PATH, hide_default_value = true)]
    pub file: PathBuf,

    /// Reviews per page (must be positive)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Width rows are measured at
    #[arg(short, long)]
    pub width: Option<f64>,

    /// Height of the simulated viewport
    #[arg(long)]
    pub viewport_height: Option<f64>,

    /// Simulated latency per page, in milliseconds
    #[arg(long, default_value = "0")]
    pub latency_ms: u64,

    /// Lift the line cap of every review before printing
    #[arg(long)]
    pub expand_all: bool,

    /// Fetch avatars and photos through the image cache
    #[arg(long)]
    pub load_images: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        let limit_override = args.limit.and_then(|l| usize::try_from(l).ok());
        config::apply_cli_overrides(with_env, limit_override, args.width, args.viewport_height)
    };

    reviewfeed::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let source = FileSource::new(&args.file, config.page_limit)
        .with_latency(Duration::from_millis(args.latency_ms));
    let mut controller = FetchController::new(
        Arc::new(source),
        Arc::new(StarRatingRenderer::default()),
        config.page_limit,
    );

    let presenter = Rc::new(RefCell::new(FeedPresenter::new(
        LayoutEngine::default(),
        config.prefetch_screens,
    )));
    let sink = Rc::clone(&presenter);
    controller.set_state_listener(move |state, appended| {
        let update = sink.borrow_mut().apply(state, appended);
        info!(items = state.len(), ?update, "Feed updated");
    });

    scroll_to_end(&mut controller, &presenter, config.viewport_width, config.viewport_height)?;

    if args.expand_all {
        let ids: Vec<_> = controller
            .state()
            .items()
            .iter()
            .filter_map(DisplayItem::id)
            .collect();
        for id in ids {
            controller.expand_text(id);
        }
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    print_feed(&mut out, &mut presenter.borrow_mut(), config.viewport_width)?;

    if args.load_images {
        let transport = RoutingTransport::new(http_or_placeholders(HttpTransport::new()));
        let cache = ImageCache::new(Arc::new(transport), config.image_workers)?;
        let (loaded, placeholders) = load_images(&presenter.borrow(), &cache);
        writeln!(out, "images: {loaded} loaded, {placeholders} placeholder")?;
    }

    out.flush()?;
    Ok(())
}

/// Flick to the bottom after every page until the feed is exhausted.
fn scroll_to_end(
    controller: &mut FetchController,
    presenter: &Rc<RefCell<FeedPresenter>>,
    width: f64,
    viewport_height: f64,
) -> Result<(), AppError> {
    controller.request_next();
    loop {
        if !controller.wait_for_page(PAGE_TIMEOUT) {
            warn!(timeout = ?PAGE_TIMEOUT, "Gave up waiting for a page");
            return Ok(());
        }
        if let Some(err) = controller.take_error() {
            return Err(err.into());
        }
        if !controller.state().should_load() {
            return Ok(());
        }

        let content_height = presenter.borrow_mut().content_height(width);
        let metrics = ScrollMetrics {
            viewport_height,
            content_height,
            target_offset: (content_height - viewport_height).max(0.0),
        };
        if presenter.borrow().drag_ended(metrics) {
            controller.request_next();
        }
    }
}

fn print_feed(out: &mut impl Write, presenter: &mut FeedPresenter, width: f64) -> io::Result<()> {
    for index in 0..presenter.item_count() {
        let height = presenter.height_for(index, width);
        match presenter.item_at(index) {
            Some(DisplayItem::Review(row)) => {
                let show_more = presenter
                    .layout_at(index, width)
                    .is_some_and(|layout| layout.show_more_visible);
                writeln!(
                    out,
                    "{index:>3} {height:>7.1}  {}  {} · {}{}{}",
                    row.rating().label(),
                    row.author_name(),
                    row.created(),
                    if row.photos().is_empty() {
                        String::new()
                    } else {
                        format!(" · {} фото", row.photos().len())
                    },
                    if show_more { " · ещё" } else { "" },
                )?;
            }
            Some(DisplayItem::CountFooter(footer)) => {
                writeln!(out, "{index:>3} {height:>7.1}  {}", footer.label())?;
            }
            None => {}
        }
    }
    Ok(())
}

/// Keep going without HTTP when the client cannot be built.
fn http_or_placeholders(http: Result<HttpTransport, ImageError>) -> Option<HttpTransport> {
    match http {
        Ok(http) => Some(http),
        Err(err) => {
            warn!(
                error = %err,
                "HTTP client unavailable, remote images will show placeholders"
            );
            None
        }
    }
}

/// Bind every row image to its own slot and wait for the results.
fn load_images(presenter: &FeedPresenter, cache: &ImageCache) -> (usize, usize) {
    let mut slots = ImageSlots::new();
    let mut loaded = 0;
    let mut placeholders = 0;
    let mut tally = |image: &SlotImage| match image {
        SlotImage::Loaded(_) => loaded += 1,
        SlotImage::Placeholder => placeholders += 1,
        SlotImage::Loading => {}
    };

    let mut next_slot = 0;
    for index in 0..presenter.item_count() {
        for image in presenter.images_at(index) {
            let (_, initial) = slots.assign(cache, SlotId(next_slot), &image);
            tally(&initial);
            next_slot += 1;
        }
    }

    let deadline = Instant::now() + IMAGE_TIMEOUT;
    while slots.pending() > 0 && Instant::now() < deadline {
        for update in slots.poll() {
            let image = update
                .image
                .map_or(SlotImage::Placeholder, SlotImage::Loaded);
            tally(&image);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    (loaded, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["reviewfeed", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["reviewfeed", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["reviewfeed"]);
        assert_eq!(args.file, PathBuf::from(DEFAULT_PAYLOAD_PATH));
        assert_eq!(args.limit, None);
        assert_eq!(args.width, None);
        assert_eq!(args.viewport_height, None);
        assert_eq!(args.latency_ms, 0);
        assert!(!args.expand_all);
        assert!(!args.load_images);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_file_path_populates_file_field() {
        let args = Args::parse_from(["reviewfeed", "reviews.json"]);
        assert_eq!(args.file, PathBuf::from("reviews.json"));
    }

    #[test]
    fn test_limit_flags() {
        let args = Args::parse_from(["reviewfeed", "-l", "5"]);
        assert_eq!(args.limit, Some(5));
        let args = Args::parse_from(["reviewfeed", "--limit", "50"]);
        assert_eq!(args.limit, Some(50));
    }

    #[test]
    fn test_limit_rejects_zero() {
        let result = Args::try_parse_from(["reviewfeed", "-l", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_width_and_height() {
        let args = Args::parse_from(["reviewfeed", "-w", "414", "--viewport-height", "896"]);
        assert_eq!(args.width, Some(414.0));
        assert_eq!(args.viewport_height, Some(896.0));
    }

    #[test]
    fn test_boolean_flags() {
        let args = Args::parse_from(["reviewfeed", "--expand-all", "--load-images"]);
        assert!(args.expand_all);
        assert!(args.load_images);
    }

    #[test]
    fn print_feed_lists_rows_and_footer() {
        // Feed mutation is crate-private, so drive a controller instead.
        let payload = r#"{"count": 1, "items": [{
            "first_name": "Анна", "last_name": "Иванова", "rating": 4,
            "text": "Хорошо", "created": "13 мая"
        }]}"#;
        let path = std::env::temp_dir().join("reviewfeed_main_print.json");
        std::fs::write(&path, payload.as_bytes()).expect("write payload");

        let mut controller = FetchController::new(
            Arc::new(FileSource::new(&path, 20)),
            Arc::new(StarRatingRenderer::default()),
            20,
        );
        controller.request_next();
        assert!(controller.wait_for_page(PAGE_TIMEOUT));
        let _ = std::fs::remove_file(&path);

        let mut presenter = FeedPresenter::new(LayoutEngine::default(), 2.5);
        presenter.apply(controller.state(), true);

        let mut out = Vec::new();
        print_feed(&mut out, &mut presenter, 375.0).expect("write to vec");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("★★★★☆  Анна Иванова · 13 мая"), "got: {text}");
        assert!(text.contains("1 отзывов"), "got: {text}");
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn http_client_failure_is_logged_before_falling_back() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        let http = tracing::subscriber::with_default(subscriber, || {
            http_or_placeholders(Err(ImageError::Transport {
                url: "https://cdn.example".to_string(),
                reason: "no TLS backend".to_string(),
            }))
        });

        assert!(http.is_none());
        let text = String::from_utf8(log.0.lock().expect("lock").clone()).expect("utf8");
        assert!(text.contains("WARN"), "got: {text}");
        assert!(text.contains("remote images will show placeholders"), "got: {text}");
        assert!(text.contains("no TLS backend"), "got: {text}");
    }

    #[test]
    fn default_payload_is_bundled() {
        let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_PAYLOAD_PATH);
        assert!(bundled.is_file(), "missing {}", bundled.display());
    }
}
