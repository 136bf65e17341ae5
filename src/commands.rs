use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::warn;

use dataset_store::{write_prediction_row, DatasetWriter};
use trend_engine::{FeatureExtractor, LabelingPipeline, RankingPipeline};
use trendpulse_core::{
    AppConfig, ChannelStats, FilterConfig, ShortsPolicy, VideoDuration, VideoRecord,
};
use youtube_client::{ChannelAverages, TrendingCollector, YouTubeApiClient};

#[derive(Parser, Debug)]
#[command(
    name = "trendpulse",
    version,
    about = "Trending-video momentum ranking and viral-dataset collection"
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Region whose trending feed to use (overrides the config file)
    #[arg(long, global = true)]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the region's current trending feed by momentum score
    Rank {
        /// Show only the top N candidates
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Collect a balanced viral/non-viral training dataset
    Collect {
        /// Output CSV path
        #[arg(long, default_value = "data/trendpulse_dataset.csv")]
        output: PathBuf,
        /// Topic query for the non-trending sample (repeatable;
        /// defaults to the configured queries)
        #[arg(long = "query")]
        queries: Vec<String>,
    },
    /// Emit one prediction-time feature row in the canonical column order
    PredictFeatures {
        /// Fetch the video and its channel stats by video id
        #[arg(long)]
        video_id: Option<String>,

        // Manual mode, for stats read off the watch page.
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        views: Option<u64>,
        #[arg(long)]
        likes: Option<u64>,
        #[arg(long)]
        comments: Option<u64>,
        #[arg(long)]
        subscribers: Option<u64>,
        #[arg(long)]
        duration_seconds: Option<u32>,
        #[arg(long)]
        age_hours: Option<f64>,
        /// Override the publish hour (0-23); defaults to the hour
        /// implied by --age-hours
        #[arg(long)]
        publish_hour: Option<u32>,
        #[arg(long, default_value_t = 0)]
        total_channel_views: u64,
        #[arg(long, default_value_t = 0)]
        channel_video_count: u64,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(region) = cli.region {
        config.region = region;
    }

    match cli.command {
        Command::Rank { top } => rank(&config, top).await,
        Command::Collect { output, queries } => collect(&config, output, queries).await,
        Command::PredictFeatures {
            video_id,
            title,
            views,
            likes,
            comments,
            subscribers,
            duration_seconds,
            age_hours,
            publish_hour,
            total_channel_views,
            channel_video_count,
        } => {
            if let Some(video_id) = video_id {
                predict_fetched(&config, &video_id).await
            } else {
                let manual = ManualVideo {
                    title: title.context("--title is required without --video-id")?,
                    views: views.context("--views is required without --video-id")?,
                    likes: likes.context("--likes is required without --video-id")?,
                    comments: comments.context("--comments is required without --video-id")?,
                    subscribers: subscribers
                        .context("--subscribers is required without --video-id")?,
                    duration_seconds: duration_seconds
                        .context("--duration-seconds is required without --video-id")?,
                    age_hours: age_hours.context("--age-hours is required without --video-id")?,
                    publish_hour,
                    total_channel_views,
                    channel_video_count,
                };
                predict_manual(manual)
            }
        }
    }
}

fn build_client(config: &AppConfig) -> anyhow::Result<YouTubeApiClient> {
    let api_key = config.api_key().context("resolving the YouTube API key")?;
    Ok(YouTubeApiClient::new(
        api_key.to_string(),
        config.quota_budget,
    )?)
}

async fn rank(config: &AppConfig, top: usize) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let collector = TrendingCollector::new(&client);

    let videos = collector
        .fetch_trending_videos(&config.region, config.max_results, config.trending_pages)
        .await?;
    let batch = collector
        .assemble(videos, &config.region, ChannelAverages::Skip)
        .await?;

    let pipeline = RankingPipeline::new(config.filter.clone(), config.scoring);
    let ranked = pipeline.rank(&batch.videos, &batch.stats, &batch.categories, Utc::now());

    if ranked.is_empty() {
        println!("No candidates passed the filters.");
        return Ok(());
    }

    println!(
        "{:>3}  {:>10}  {:>12}  {:>12}  {:<22}  {}",
        "#", "score", "views", "subscribers", "category", "title"
    );
    for (position, candidate) in ranked.iter().take(top).enumerate() {
        println!(
            "{:>3}  {:>10.3}  {:>12}  {:>12}  {:<22}  {}",
            position + 1,
            candidate.score,
            candidate.video.views,
            candidate.subscriber_count,
            truncate(&candidate.category, 22),
            truncate(&candidate.video.title, 70)
        );
    }
    Ok(())
}

async fn collect(
    config: &AppConfig,
    output: PathBuf,
    queries: Vec<String>,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let collector = TrendingCollector::new(&client);

    let mut videos = collector
        .fetch_trending_videos(&config.region, config.max_results, config.trending_pages)
        .await?;

    let queries = if queries.is_empty() {
        config.topic_queries.clone()
    } else {
        queries
    };
    for query in &queries {
        videos.extend(
            collector
                .fetch_topic_videos(query, config.max_results)
                .await?,
        );
    }

    let batch = collector
        .assemble(
            videos,
            &config.region,
            ChannelAverages::RecentUploads {
                sample_size: config.channel_sample_size,
            },
        )
        .await?;

    // Dataset collection swaps the encoding-based Shorts rule for the
    // configured numeric floor.
    let labeling_filter = FilterConfig {
        shorts_policy: ShortsPolicy::MinSeconds(config.labeling.min_duration_seconds),
        ..config.filter.clone()
    };
    let pipeline = LabelingPipeline::new(labeling_filter, config.labeling.clone());
    let report = pipeline.run(
        &batch.videos,
        &batch.stats,
        &batch.channel_avg_views,
        &batch.categories,
        Utc::now(),
    );

    let written = DatasetWriter::new(&output).append(&report.samples)?;

    println!("Collection report");
    println!("  collected:      {}", report.collected);
    println!("  skipped:        {}", report.skipped);
    println!("  viral:          {}", report.labeled_viral);
    println!("  non-viral:      {}", report.labeled_nonviral);
    println!("  written (bal.): {}", written);
    println!("  dataset:        {}", output.display());
    Ok(())
}

async fn predict_fetched(config: &AppConfig, video_id: &str) -> anyhow::Result<()> {
    let client = build_client(config)?;

    let items = client.list_videos(&[video_id.to_string()]).await?;
    let record = items
        .into_iter()
        .next()
        .and_then(|item| item.into_record())
        .with_context(|| format!("video {video_id} does not exist or is private"))?;

    let channels = client.list_channels(&[record.channel_id.clone()]).await?;
    let stats = channels
        .into_iter()
        .next()
        .map(|item| item.into_stats())
        .with_context(|| format!("no channel stats for {}", record.channel_id))?;

    if stats.subscriber_count.is_none() {
        bail!(
            "channel {} hides its subscriber count; the feature row would be meaningless",
            record.channel_id
        );
    }

    let extractor = FeatureExtractor::new(Utc::now());
    let features = extractor.extract(&record, &stats);
    write_prediction_row(io::stdout(), &features)?;
    Ok(())
}

struct ManualVideo {
    title: String,
    views: u64,
    likes: u64,
    comments: u64,
    subscribers: u64,
    duration_seconds: u32,
    age_hours: f64,
    publish_hour: Option<u32>,
    total_channel_views: u64,
    channel_video_count: u64,
}

fn predict_manual(manual: ManualVideo) -> anyhow::Result<()> {
    let now = Utc::now();
    let age_seconds = (manual.age_hours.max(0.0) * 3600.0) as i64;
    let record = VideoRecord {
        id: "manual".to_string(),
        title: manual.title,
        description: String::new(),
        tags: vec![],
        category_id: String::new(),
        duration: Some(VideoDuration::from_seconds(manual.duration_seconds)),
        published_at: now - chrono::Duration::seconds(age_seconds),
        channel_id: "manual".to_string(),
        views: manual.views,
        likes: manual.likes,
        comments: manual.comments,
    };
    let stats = ChannelStats {
        channel_id: "manual".to_string(),
        subscriber_count: Some(manual.subscribers),
        total_views: manual.total_channel_views,
        video_count: manual.channel_video_count,
    };

    if manual.total_channel_views == 0 {
        warn!("no --total-channel-views given; views_per_video will be 0");
    }

    let extractor = FeatureExtractor::new(now);
    let mut features = extractor.extract(&record, &stats);
    if let Some(hour) = manual.publish_hour {
        if hour > 23 {
            bail!("--publish-hour must be between 0 and 23");
        }
        features.publish_hour = hour as f64;
    }

    write_prediction_row(io::stdout(), &features)?;
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
