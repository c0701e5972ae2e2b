use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use interactions::{suggested_followups, InteractionService};
use record::parse::{parse_date, parse_sample, parse_time};
use record::{Draft, InteractionType, RecordId, Sample, Sentiment};
use std::path::PathBuf;

use crate::output;

#[derive(Parser)]
#[command(
    name = "hcp-log",
    version,
    about = "Log and review HCP interactions",
    long_about = "Log visits with healthcare professionals from structured flags or free text.\n\n\
                  Free text is turned into a structured record by the extraction service."
)]
pub struct Cli {
    /// Keep records in memory and extract with the local LLM
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print operation counters when the command finishes
    #[arg(long, global = true)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List logged interactions")]
    List,

    #[command(about = "Log an interaction from flags")]
    Log(LogArgs),

    #[command(about = "Extract an interaction from free text")]
    Chat(ChatArgs),

    #[command(about = "Delete an interaction")]
    Delete { id: RecordId },

    #[command(about = "Print an interaction as JSON, or replace it from an edited file")]
    Edit(EditArgs),
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(long = "hcp")]
    pub hcp_name: String,

    #[arg(long = "type", default_value = "Meeting")]
    pub interaction_type: InteractionType,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// HH:MM, read as UTC
    #[arg(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,

    /// Comma separated
    #[arg(long, default_value = "")]
    pub attendees: String,

    #[arg(long = "topic")]
    pub topics: Vec<String>,

    #[arg(long = "material")]
    pub materials: Vec<String>,

    /// NAME:QTY, NAME xQTY or just NAME
    #[arg(long = "sample", value_parser = parse_sample)]
    pub samples: Vec<Sample>,

    #[arg(long, default_value = "neutral")]
    pub sentiment: Sentiment,

    #[arg(long, default_value = "")]
    pub outcomes: String,

    #[arg(long = "follow-up")]
    pub followups: Vec<String>,

    /// Run the draft through extraction and save the merged result
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Args)]
pub struct ChatArgs {
    pub text: String,

    /// Save the extracted interaction
    #[arg(long)]
    pub save: bool,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: RecordId,

    /// Edited JSON document to submit
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl LogArgs {
    pub fn into_draft(self) -> Draft {
        let mut draft = Draft {
            hcp_name: self.hcp_name,
            interaction_type: self.interaction_type,
            date: self.date,
            time: self.time,
            attendees: self.attendees,
            topics: self.topics.join("\n"),
            sentiment: self.sentiment,
            outcomes: self.outcomes,
            followups: self.followups.join("\n"),
            ..Draft::default()
        };
        for material in &self.materials {
            draft.add_material(material);
        }
        for sample in self.samples {
            draft.add_sample(&sample.name, sample.quantity);
        }
        draft
    }
}

pub async fn list(service: &InteractionService) -> Result<()> {
    let records = service.fetch().await?;
    output::records(&records);
    Ok(())
}

pub async fn log(service: &InteractionService, args: LogArgs) -> Result<()> {
    let summarize = args.summarize;
    let mut draft = args.into_draft();

    let record = if summarize {
        service.save_and_summarize(&mut draft).await?
    } else {
        service.save_draft(&mut draft).await?
    };
    output::saved(&record);
    Ok(())
}

pub async fn chat(service: &InteractionService, args: ChatArgs) -> Result<()> {
    let result = service.request_extraction(&args.text).await?;
    output::extraction(&result, &suggested_followups(&result));

    if args.save {
        let mut draft = Draft::new();
        let record = service.save_extracted(&mut draft).await?;
        output::saved(&record);
    }
    Ok(())
}

pub async fn delete(service: &InteractionService, id: RecordId) -> Result<()> {
    service.delete(id).await?;
    println!("Deleted interaction {id}");
    Ok(())
}

pub async fn edit(service: &InteractionService, args: EditArgs) -> Result<()> {
    service.fetch().await?;

    match args.file {
        None => {
            println!("{}", service.raw_document(args.id).await?);
        }
        Some(path) => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let record = service.edit(args.id, &text).await?;
            output::saved(&record);
        }
    }
    Ok(())
}
