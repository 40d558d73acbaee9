//! Structural summary of an image manifest

use crate::{
    engine::Engine,
    errors::CasError,
    image::{ContentDigest, MediaType},
    manifest::{Descriptor, History},
    walk::ImageGraph,
};
use indicatif::HumanBytes;
use std::io::{self, Write};

/// One build history entry, with the layer it produced if any
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryStat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_id: Option<ContentDigest>,
    #[serde(flatten)]
    pub entry: History,
}

/// Summary of one image manifest
///
/// The serialized form (see [StatSummary::to_json_writer]) has stable field
/// names and is meant for other programs. [StatSummary::render_human] is for
/// people, and its layout may change between versions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub media_type: MediaType,
    pub digest: ContentDigest,
    pub size: u64,
    pub config: Descriptor,
    pub layers: Vec<Descriptor>,
    /// Manifest, config and layer sizes added up, from descriptors alone
    pub aggregate_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryStat>,
}

/// Walk the manifest at `descriptor` and summarize it
///
/// Either the whole summary is produced or an error is returned.
pub fn stat(engine: &Engine, descriptor: &Descriptor) -> Result<StatSummary, CasError> {
    StatSummary::from_graph(descriptor, engine.walk(descriptor)?)
}

impl Engine {
    /// Same as [stat]
    pub fn stat(&self, descriptor: &Descriptor) -> Result<StatSummary, CasError> {
        stat(self, descriptor)
    }
}

impl StatSummary {
    /// Assemble a summary from an already walked manifest
    pub fn from_graph(descriptor: &Descriptor, graph: ImageGraph) -> Result<Self, CasError> {
        let ImageGraph {
            manifest,
            config,
            layers,
        } = graph;

        let aggregate_size = layers.iter().fold(
            descriptor.size.saturating_add(manifest.config.size),
            |total, layer| total.saturating_add(layer.size),
        );

        let diff_ids = config
            .rootfs
            .map(|rootfs| rootfs.diff_ids)
            .unwrap_or_default();
        let mut layer_index = 0;
        let mut history = Vec::with_capacity(config.history.len());
        for entry in config.history {
            if entry.empty_layer {
                history.push(HistoryStat {
                    layer: None,
                    diff_id: None,
                    entry,
                });
                continue;
            }
            let layer = match layers.get(layer_index) {
                Some(layer) => layer.clone(),
                None => {
                    return Err(CasError::MalformedConfig {
                        digest: manifest.config.digest.clone(),
                        reason: format!(
                            "history has more non-empty entries than the {} layers in the manifest",
                            layers.len()
                        ),
                    })
                }
            };
            history.push(HistoryStat {
                layer: Some(layer),
                diff_id: diff_ids.get(layer_index).cloned(),
                entry,
            });
            layer_index += 1;
        }

        Ok(StatSummary {
            media_type: descriptor.media_type.clone(),
            digest: descriptor.digest.clone(),
            size: descriptor.size,
            config: manifest.config,
            layers,
            aggregate_size,
            created: config.created,
            architecture: config.architecture,
            os: config.os,
            history,
        })
    }

    /// Write the machine-readable json form
    pub fn to_json_writer<W: Write>(&self, out: W) -> Result<(), CasError> {
        Ok(serde_json::to_writer(out, self)?)
    }

    /// Write a text rendering meant for people
    ///
    /// Do not parse this; the layout is not stable. Use
    /// [StatSummary::to_json_writer] for anything automated.
    pub fn render_human<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "MANIFEST")?;
        writeln!(out, "  Media Type:  {}", self.media_type)?;
        writeln!(out, "  Digest:      {}", self.digest)?;
        writeln!(out, "  Size:        {}", HumanBytes(self.size))?;
        writeln!(
            out,
            "  Config:      {} ({})",
            self.config.digest,
            HumanBytes(self.config.size)
        )?;
        if let Some(created) = &self.created {
            writeln!(out, "  Created:     {}", created)?;
        }
        if let (Some(os), Some(architecture)) = (&self.os, &self.architecture) {
            writeln!(out, "  Platform:    {}/{}", os, architecture)?;
        }
        writeln!(out, "  Total Size:  {}", HumanBytes(self.aggregate_size))?;

        writeln!(out)?;
        writeln!(out, "LAYERS")?;
        write_table(
            &mut out,
            &["DIGEST", "MEDIA TYPE", "SIZE"],
            self.layers
                .iter()
                .map(|layer| {
                    vec![
                        layer.digest.to_string(),
                        layer.media_type.to_string(),
                        HumanBytes(layer.size).to_string(),
                    ]
                })
                .collect(),
        )?;

        if !self.history.is_empty() {
            writeln!(out)?;
            writeln!(out, "HISTORY")?;
            write_table(
                &mut out,
                &["LAYER", "CREATED", "CREATED BY", "SIZE", "COMMENT"],
                self.history.iter().map(history_row).collect(),
            )?;
        }
        Ok(())
    }
}

const NONE: &str = "<none>";

fn history_row(stat: &HistoryStat) -> Vec<String> {
    let text = |value: &Option<String>| match value {
        Some(value) => single_line(value),
        None => String::new(),
    };
    vec![
        stat.layer
            .as_ref()
            .map_or_else(|| NONE.to_owned(), |layer| layer.digest.to_string()),
        text(&stat.entry.created),
        text(&stat.entry.created_by),
        stat.layer
            .as_ref()
            .map_or_else(|| NONE.to_owned(), |layer| HumanBytes(layer.size).to_string()),
        text(&stat.entry.comment),
    ]
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Left-aligned columns separated by two spaces, no trailing padding
fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: Vec<Vec<String>>) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let header_row: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header_row).chain(rows.iter()) {
        let mut line = String::new();
        for (column, (cell, width)) in row.iter().zip(&widths).enumerate() {
            if column > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            if column + 1 < row.len() {
                let padding = width - cell.chars().count();
                line.extend(std::iter::repeat(' ').take(padding));
            }
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
