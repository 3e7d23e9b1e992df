use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Float32Type, Float64Type, Int32Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use super::model::{Hand, PitchDataset, PitchEvent, PITCH_COLUMNS};
use super::query::{FlowTable, FLOW_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load the consolidated table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the published column names
/// * `.parquet` – one column per field, as written by [`write_file`]
pub fn load_file(path: &Path) -> Result<PitchDataset> {
    let events = match extension(path).as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    Ok(PitchDataset::from_events(events))
}

/// Persist the consolidated table.  Dispatch by extension.
pub fn write_file(path: &Path, events: &[PitchEvent]) -> Result<()> {
    match extension(path).as_str() {
        "csv" => write_csv(path, events),
        "parquet" | "pq" => write_parquet(path, events),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Save the aggregated table shown in the dashboard as `.csv` or `.json`.
pub fn export_flow_table(path: &Path, table: &FlowTable) -> Result<()> {
    match extension(path).as_str() {
        "csv" => {
            let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
            if table.is_empty() {
                writer.write_record(FLOW_COLUMNS).context("writing CSV header")?;
            }
            for row in &table.rows {
                writer.serialize(row).context("writing CSV row")?;
            }
            writer.flush().context("flushing CSV")?;
        }
        "json" => {
            let mut writer = BufWriter::new(File::create(path).context("creating JSON file")?);
            serde_json::to_writer_pretty(&mut writer, &table.rows).context("writing JSON")?;
            writer.flush().context("flushing JSON")?;
        }
        other => bail!("Unsupported export extension: .{other}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<PitchEvent>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for col in PITCH_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    reader
        .deserialize::<PitchEvent>()
        .enumerate()
        .map(|(row_no, row)| row.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

fn write_csv(path: &Path, events: &[PitchEvent]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    if events.is_empty() {
        writer.write_record(PITCH_COLUMNS).context("writing CSV header")?;
    }
    for event in events {
        writer.serialize(event).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<Vec<PitchEvent>> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut events = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let col = |name: &str| column(&batch, name);

        let player_name = col("player_name")?;
        let events_col = col("events")?;
        let description = col("description")?;
        let b_arm = col("b_arm")?;
        let p_arm = col("p_arm")?;
        let balls = col("balls")?;
        let strikes = col("strikes")?;
        let bb_type = col("bb_type")?;
        let inning = col("inning")?;
        let outs_when_up = col("outs_when_up")?;
        let hit_distance_sc = col("hit_distance_sc")?;
        let launch_speed = col("launch_speed")?;
        let pitch_speed = col("pitch_speed")?;
        let spin_rate = col("spin_rate")?;
        let pitch_name = col("pitch_name")?;
        let win_exp = col("win_exp")?;
        let team = col("team")?;

        for row in 0..batch.num_rows() {
            let event = PitchEvent {
                player_name: required(string_at(player_name, row)?, "player_name")?,
                events: required(string_at(events_col, row)?, "events")?,
                description: string_at(description, row)?,
                b_arm: hand_at(b_arm, row)?,
                p_arm: hand_at(p_arm, row)?,
                balls: u8_at(balls, row)?,
                strikes: u8_at(strikes, row)?,
                bb_type: string_at(bb_type, row)?,
                inning: u8_at(inning, row)?,
                outs_when_up: u8_at(outs_when_up, row)?,
                hit_distance_sc: f64_at(hit_distance_sc, row)?.unwrap_or(0.0),
                launch_speed: f64_at(launch_speed, row)?,
                pitch_speed: f64_at(pitch_speed, row)?,
                spin_rate: f64_at(spin_rate, row)?,
                pitch_name: required(string_at(pitch_name, row)?, "pitch_name")?,
                win_exp: f64_at(win_exp, row)?,
                team: required(string_at(team, row)?, "team")?,
            };
            events.push(event);
        }
    }

    Ok(events)
}

fn write_parquet(path: &Path, events: &[PitchEvent]) -> Result<()> {
    let text = |name: &str, nullable: bool| Field::new(name, DataType::Utf8, nullable);
    let int = |name: &str| Field::new(name, DataType::Int64, true);
    let float = |name: &str, nullable: bool| Field::new(name, DataType::Float64, nullable);

    let schema = Arc::new(Schema::new(vec![
        text("player_name", false),
        text("events", false),
        text("description", true),
        text("b_arm", false),
        text("p_arm", false),
        int("balls"),
        int("strikes"),
        text("bb_type", true),
        int("inning"),
        int("outs_when_up"),
        float("hit_distance_sc", false),
        float("launch_speed", true),
        float("pitch_speed", true),
        float("spin_rate", true),
        text("pitch_name", false),
        float("win_exp", true),
        text("team", false),
    ]));

    let strings = |f: fn(&PitchEvent) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(events.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&PitchEvent) -> Option<u8>| -> ArrayRef {
        Arc::new(Int64Array::from(
            events.iter().map(|e| f(e).map(i64::from)).collect::<Vec<_>>(),
        ))
    };
    let floats = |f: fn(&PitchEvent) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(events.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        strings(|e| Some(e.player_name.as_str())),
        strings(|e| Some(e.events.as_str())),
        strings(|e| e.description.as_deref()),
        strings(|e| Some(e.b_arm.as_str())),
        strings(|e| Some(e.p_arm.as_str())),
        ints(|e| e.balls),
        ints(|e| e.strikes),
        strings(|e| e.bb_type.as_deref()),
        ints(|e| e.inning),
        ints(|e| e.outs_when_up),
        floats(|e| Some(e.hit_distance_sc)),
        floats(|e| e.launch_speed),
        floats(|e| e.pitch_speed),
        floats(|e| e.spin_rate),
        strings(|e| Some(e.pitch_name.as_str())),
        floats(|e| e.win_exp),
        strings(|e| Some(e.team.as_str())),
    ];

    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn required(value: Option<String>, column: &str) -> Result<String> {
    value.with_context(|| format!("null value in required column '{column}'"))
}

fn string_at(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row),
        other => bail!("Expected a string column, got {other:?}"),
    };
    Ok(Some(value.to_string()))
}

fn hand_at(col: &ArrayRef, row: usize) -> Result<Hand> {
    required(string_at(col, row)?, "arm")?
        .parse()
        .map_err(|e: String| anyhow!("row {row}: {e}"))
}

fn f64_at(col: &ArrayRef, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok((!value.is_nan()).then_some(value))
}

fn u8_at(col: &ArrayRef, row: usize) -> Result<Option<u8>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row),
        DataType::Int32 => i64::from(col.as_primitive::<Int32Type>().value(row)),
        other => bail!("Expected an integer column, got {other:?}"),
    };
    u8::try_from(value)
        .map(Some)
        .with_context(|| format!("row {row}: {value} out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::sample_event;

    fn events() -> Vec<PitchEvent> {
        let mut walk = sample_event("Bello, Brayan", "walk", "Sinker", 93.2);
        walk.description = Some("ball".to_string());
        walk.win_exp = None;
        walk.team = "Red Sox".to_string();
        let mut out = sample_event("Cole, Gerrit", "pop_out", "4-Seam Fastball", 97.1);
        out.bb_type = Some("popup".to_string());
        out.hit_distance_sc = 151.0;
        out.pitch_speed = None;
        vec![walk, out]
    }

    #[test]
    fn csv_round_trip_keeps_missing_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pitcher_data.csv");
        write_file(&path, &events()).expect("write csv");

        let ds = load_file(&path).expect("load csv");
        assert_eq!(ds.events(), events().as_slice());
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pitcher_data.parquet");
        write_file(&path, &events()).expect("write parquet");

        let ds = load_file(&path).expect("load parquet");
        assert_eq!(ds.events(), events().as_slice());
    }

    #[test]
    fn empty_csv_still_has_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.csv");
        write_file(&path, &[]).expect("write csv");

        let text = std::fs::read_to_string(&path).expect("read back");
        assert!(text.starts_with("player_name,events,description"));
        assert!(load_file(&path).expect("load csv").is_empty());
    }

    #[test]
    fn csv_missing_column_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "player_name,events\nCole,single\n").expect("write");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("description"));
    }

    #[test]
    fn unsupported_extension() {
        assert!(load_file(Path::new("pitches.xlsx")).is_err());
        assert!(write_file(Path::new("pitches.txt"), &[]).is_err());
    }

    #[test]
    fn exports_empty_flow_table_with_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let csv_path = dir.path().join("flow.csv");
        export_flow_table(&csv_path, &FlowTable::default()).expect("export csv");
        let text = std::fs::read_to_string(&csv_path).expect("read back");
        assert_eq!(text.trim_end(), FLOW_COLUMNS.join(","));

        let json_path = dir.path().join("flow.json");
        export_flow_table(&json_path, &FlowTable::default()).expect("export json");
        let text = std::fs::read_to_string(&json_path).expect("read back");
        assert_eq!(text.trim(), "[]");
    }
}
