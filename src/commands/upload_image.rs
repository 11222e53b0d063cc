use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::{
    config::Settings,
    store::{ImageRecord, save_image_record},
    upload::{UploadOutcome, Uploader},
};

pub async fn execute(path: &Path, settings: &Settings) -> Result<()> {
    println!("{}", "🖼️  Uploading image...\n".bold());

    let uploader = Uploader::from_settings(settings);
    let outcome = uploader.upload_image(path).await?;
    print_outcome(&outcome);

    let record = image_record(path, &outcome);
    let saved = save_image_record(&settings.image_output_dir, &record)?;
    println!("\n💾 Upload record saved to {}", saved.display().to_string().cyan());
    Ok(())
}

fn image_record(path: &Path, outcome: &UploadOutcome) -> ImageRecord {
    ImageRecord {
        original_file: path.display().to_string(),
        url: outcome.url.clone(),
        timestamp: Utc::now(),
    }
}

fn print_outcome(outcome: &UploadOutcome) {
    println!("{}", "✅ Image uploaded!".green().bold());
    if let Some(hosted) = &outcome.primary {
        println!("  ImgBB: {}", hosted.url);
        if let Some(display) = &hosted.display_url {
            println!("  ImgBB display: {display}");
        }
    }
    if let Some(hosted) = &outcome.secondary {
        println!("  NFT.Storage: {}", hosted.url);
        if let Some(cid) = &hosted.cid {
            println!("  IPFS CID: {cid}");
        }
    }
    println!("\n🔗 Use this URL as the token image: {}", outcome.url.cyan());
}
