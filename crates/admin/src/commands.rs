//! Command execution. Each command returns its rendered output so it can be
//! exercised without a terminal.

use std::fmt::Write as _;

use anyhow::{Context, bail};
use serde::Serialize;

use bloodbank_infra::Stores;
use bloodbank_inventory::{InventoryQuery, InventoryRecord, InventoryStatus, InventorySummary};
use bloodbank_requests::{DonationRequest, NewDonationRequest, RequestCounts};

use crate::cli::Command;

#[derive(Debug, Serialize)]
struct InventoryReport {
    records: Vec<InventoryRecord>,
    summary: InventorySummary,
}

#[derive(Debug, Serialize)]
struct RequestsReport {
    source: &'static str,
    counts: RequestCounts,
    requests: Vec<DonationRequest>,
}

pub async fn run(stores: &Stores, command: Command, json: bool) -> anyhow::Result<String> {
    match command {
        Command::Inventory { status, search } => {
            let all = stores.inventory.list_inventory_or_seed().await;
            let records = InventoryQuery { status, search }.apply(&all);
            let summary = InventorySummary::from_records(&all);
            let report = InventoryReport { records, summary };
            if json {
                to_json(&report)
            } else {
                Ok(render_inventory(&report))
            }
        }

        Command::SetUnits { blood_type, units } => {
            let record = stores
                .inventory
                .update_units(blood_type, units)
                .await
                .with_context(|| format!("failed to update units for {blood_type}"))?;
            if json {
                to_json(&record)
            } else {
                Ok(format!(
                    "{} now has {} units ({})\n",
                    record.blood_type(),
                    record.units(),
                    record.status()
                ))
            }
        }

        Command::Requests { kind, remote } => {
            let (source, requests) = if remote {
                let requests = stores
                    .requests
                    .list_remote(kind)
                    .await
                    .context("failed to list remote requests")?;
                ("remote", requests)
            } else {
                let requests = stores
                    .requests
                    .list_local_by_kind(kind)
                    .context("failed to read local requests")?;
                ("local", requests)
            };
            let report = RequestsReport {
                source,
                counts: RequestCounts::from_requests(&requests),
                requests,
            };
            if json {
                to_json(&report)
            } else {
                Ok(render_requests(&report))
            }
        }

        Command::Submit {
            name,
            email,
            phone,
            blood_type,
            address,
            date,
            kind,
        } => {
            let request = stores
                .requests
                .submit(NewDonationRequest {
                    name,
                    email,
                    phone,
                    blood_type,
                    address,
                    preferred_date: date,
                    request_type: kind,
                })
                .await
                .context("failed to submit request, try again")?;
            if json {
                to_json(&request)
            } else {
                Ok(format!(
                    "request #{} recorded ({} {}, {})\n",
                    request.id, request.request_type, request.blood_type, request.status
                ))
            }
        }

        Command::ClearLocal { yes } => {
            if !yes {
                bail!("refusing to delete all local requests without --yes");
            }
            let removed = stores
                .requests
                .local_counts()
                .context("failed to read local requests before clearing; nothing was removed")?
                .total;
            stores
                .requests
                .clear_local()
                .context("failed to clear local requests")?;
            if json {
                to_json(&serde_json::json!({ "removed": removed }))
            } else {
                Ok(format!("removed {removed} local request(s)\n"))
            }
        }

        Command::Migrate => {
            let Some(pg) = &stores.postgres else {
                bail!("no remote store configured; set BLOODBANK_DATABASE_URL");
            };
            pg.apply_schema().await.context("failed to apply schema")?;
            Ok("schema applied\n".to_string())
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("failed to encode output")?;
    out.push('\n');
    Ok(out)
}

fn render_inventory(report: &InventoryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:>6}  {:<9} {}", "TYPE", "UNITS", "STATUS", "UPDATED");
    for r in &report.records {
        let _ = writeln!(
            out,
            "{:<6} {:>6}  {:<9} {}",
            r.blood_type(),
            r.units(),
            r.status(),
            r.updated_at().format("%Y-%m-%d %H:%M")
        );
    }
    if report.records.is_empty() {
        let _ = writeln!(out, "(no blood types match)");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "total units: {}", report.summary.total_units);
    for status in InventoryStatus::ALL {
        let _ = writeln!(out, "  {:<24} {}", status.label(), report.summary.count(status));
    }
    out
}

fn render_requests(report: &RequestsReport) -> String {
    let mut out = String::new();
    let c = report.counts;
    let _ = writeln!(
        out,
        "{} requests: {} total, {} donors, {} recipients",
        report.source, c.total, c.donate, c.receive
    );
    if report.requests.is_empty() {
        let _ = writeln!(out, "no requests yet");
        return out;
    }
    for r in &report.requests {
        let _ = writeln!(
            out,
            "#{:<5} {:<8} {:<4} {:<9} {:<24} {:<28} {} (created {})",
            r.id,
            r.request_type,
            r.blood_type,
            r.status,
            r.name,
            r.email,
            r.preferred_date,
            r.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}
