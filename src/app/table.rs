// ==========================================
// 炉次化学成分录入系统 - 表格输出
// ==========================================
// 文本表格: 缺失值显示为 "—"
// CSV: 缺失值为空单元格
// ==========================================

use std::io::Write;

use crate::domain::chemistry::ChemistryRecord;
use crate::domain::heat::{Heat, HeatOption};
use crate::domain::types::Element;
use crate::i18n::t;

/// 缺失值占位符
pub const ABSENT_CELL: &str = "—";

/// 表格时间格式（UTC）
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 可空数值单元格
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(x) => x.to_string(),
        None => ABSENT_CELL.to_string(),
    }
}

fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT_CELL).to_string()
}

/// 按列宽对齐输出
fn render_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let pad = widths[i] - c.chars().count();
                format!("{}{}", c, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&header));
    out.push('\n');
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(total));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// 炉次表格；无数据时输出空状态提示
pub fn render_heats(heats: &[Heat]) -> String {
    if heats.is_empty() {
        return format!("{}\n", t("heat.empty"));
    }
    let header = ["ID", "Heat Code", "Supplier", "Created"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = heats
        .iter()
        .map(|h| {
            vec![
                h.id.to_string(),
                h.heat_code.clone(),
                format_text(h.supplier.as_deref()),
                h.created_at.format(CREATED_FORMAT).to_string(),
            ]
        })
        .collect();
    render_grid(header, rows)
}

/// 炉次选择项，每行 "<炉号> (#<id>)"
pub fn render_heat_options(options: &[HeatOption]) -> String {
    if options.is_empty() {
        return format!("{}\n", t("heat.empty"));
    }
    options.iter().map(|o| format!("{}\n", o)).collect()
}

/// 化学成分表格；无数据时输出空状态提示
pub fn render_chemistry(records: &[ChemistryRecord]) -> String {
    if records.is_empty() {
        return format!("{}\n", t("chemistry.empty"));
    }
    let mut header = vec!["ID".to_string(), "Heat".to_string()];
    header.extend(Element::ALL.iter().map(|e| e.label()));
    header.push("Others".to_string());
    header.push("Created".to_string());

    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![r.id.to_string(), r.heat_id.to_string()];
            row.extend(r.composition.values().iter().map(|v| format_value(*v)));
            row.push(format_text(r.others.as_deref()));
            row.push(r.created_at.format(CREATED_FORMAT).to_string());
            row
        })
        .collect();
    render_grid(header, rows)
}

/// 化学成分 CSV 导出
pub fn write_chemistry_csv<W: Write>(records: &[ChemistryRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);

    let mut header = vec!["id".to_string(), "heat_id".to_string()];
    header.extend(Element::ALL.iter().map(|e| e.column().to_string()));
    header.push("others".to_string());
    header.push("created_at".to_string());
    wtr.write_record(&header)?;

    for r in records {
        let mut row = vec![r.id.to_string(), r.heat_id.to_string()];
        row.extend(
            r.composition
                .values()
                .iter()
                .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
        );
        row.push(r.others.clone().unwrap_or_default());
        row.push(r.created_at.to_rfc3339());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chemistry::Composition;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> ChemistryRecord {
        ChemistryRecord {
            id: 3,
            heat_id: 7,
            composition: Composition {
                c: Some(0.25),
                cr: Some(18.0),
                ni: Some(0.0),
                ..Default::default()
            },
            others: Some("Ca 0.002".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(0.25)), "0.25");
        assert_eq!(format_value(Some(18.0)), "18");
        assert_eq!(format_value(Some(0.0)), "0");
        assert_eq!(format_value(None), "—");
    }

    #[test]
    fn test_render_chemistry_marks_absent() {
        let out = render_chemistry(&[sample_record()]);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].contains("MN"));
        assert!(lines[2].contains("0.25"));
        assert!(lines[2].contains("Ca 0.002"));
        assert!(lines[2].contains("2024-05-01 08:30:00"));
        assert!(lines[2].contains('—'));
    }

    #[test]
    fn test_render_heats_absent_supplier() {
        let heats = vec![Heat {
            id: 1,
            heat_code: "H-001".to_string(),
            supplier: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        }];
        let out = render_heats(&heats);
        assert!(out.lines().nth(2).unwrap().contains("H-001"));
        assert!(out.contains('—'));
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        write_chemistry_csv(&[sample_record()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,heat_id,c,mn,si,p,s,cr,ni,mo,cu,v,nb,ti,al,n,b,w,co,others,created_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("3,7,0.25,,,,,18,0,"));
        assert!(row.contains("Ca 0.002"));
    }
}
