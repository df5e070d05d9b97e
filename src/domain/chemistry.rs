// ==========================================
// 炉次化学成分录入系统 - 化学成分领域模型
// ==========================================
// 对齐: chemistry 表 (id, heat_id, c..co, others, created_at)
// 归属: 每条记录归属一个炉次，只持有 heat_id 引用
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Element, Measurement};

// ==========================================
// Composition - 17 元素成分
// ==========================================
// None 表示未测量；序列化时按列名展开
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub c: Option<f64>,
    pub mn: Option<f64>,
    pub si: Option<f64>,
    pub p: Option<f64>,
    pub s: Option<f64>,
    pub cr: Option<f64>,
    pub ni: Option<f64>,
    pub mo: Option<f64>,
    pub cu: Option<f64>,
    pub v: Option<f64>,
    pub nb: Option<f64>,
    pub ti: Option<f64>,
    pub al: Option<f64>,
    pub n: Option<f64>,
    pub b: Option<f64>,
    pub w: Option<f64>,
    pub co: Option<f64>,
}

impl Composition {
    fn slot(&mut self, element: Element) -> &mut Option<f64> {
        match element {
            Element::C => &mut self.c,
            Element::Mn => &mut self.mn,
            Element::Si => &mut self.si,
            Element::P => &mut self.p,
            Element::S => &mut self.s,
            Element::Cr => &mut self.cr,
            Element::Ni => &mut self.ni,
            Element::Mo => &mut self.mo,
            Element::Cu => &mut self.cu,
            Element::V => &mut self.v,
            Element::Nb => &mut self.nb,
            Element::Ti => &mut self.ti,
            Element::Al => &mut self.al,
            Element::N => &mut self.n,
            Element::B => &mut self.b,
            Element::W => &mut self.w,
            Element::Co => &mut self.co,
        }
    }

    /// 读取元素值
    pub fn get(&self, element: Element) -> Option<f64> {
        match element {
            Element::C => self.c,
            Element::Mn => self.mn,
            Element::Si => self.si,
            Element::P => self.p,
            Element::S => self.s,
            Element::Cr => self.cr,
            Element::Ni => self.ni,
            Element::Mo => self.mo,
            Element::Cu => self.cu,
            Element::V => self.v,
            Element::Nb => self.nb,
            Element::Ti => self.ti,
            Element::Al => self.al,
            Element::N => self.n,
            Element::B => self.b,
            Element::W => self.w,
            Element::Co => self.co,
        }
    }

    /// 写入元素测量值
    pub fn set(&mut self, element: Element, measurement: Measurement) {
        *self.slot(element) = measurement.value();
    }

    /// 按固定顺序返回全部元素值
    pub fn values(&self) -> [Option<f64>; 17] {
        Element::ALL.map(|e| self.get(e))
    }

    /// 已测量的元素个数
    pub fn measured_count(&self) -> usize {
        self.values().iter().filter(|v| v.is_some()).count()
    }
}

// ==========================================
// ChemistryRecord - 化学成分记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemistryRecord {
    pub id: i64,
    pub heat_id: i64,
    #[serde(flatten)]
    pub composition: Composition,
    pub others: Option<String>, // 其他元素/备注
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewChemistryRecord - 待写入的化学成分记录
// ==========================================
// 由 api::validator 在校验通过后构造
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChemistryRecord {
    pub heat_id: i64,
    #[serde(flatten)]
    pub composition: Composition,
    pub others: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_set_and_get() {
        let mut comp = Composition::default();
        comp.set(Element::C, Measurement::Number(0.25));
        comp.set(Element::Cr, Measurement::Number(18.0));
        comp.set(Element::Mn, Measurement::Absent);

        assert_eq!(comp.get(Element::C), Some(0.25));
        assert_eq!(comp.get(Element::Cr), Some(18.0));
        assert_eq!(comp.get(Element::Mn), None);
        assert_eq!(comp.measured_count(), 2);
    }

    #[test]
    fn test_composition_values_follow_element_order() {
        let mut comp = Composition::default();
        comp.set(Element::Co, Measurement::Number(1.5));
        let values = comp.values();
        assert_eq!(values[16], Some(1.5));
        assert!(values[..16].iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_record_serializes_flat_columns() {
        let mut comp = Composition::default();
        comp.set(Element::Ni, Measurement::Number(8.0));
        let record = NewChemistryRecord {
            heat_id: 3,
            composition: comp,
            others: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["heat_id"], 3);
        assert_eq!(json["ni"], 8.0);
        assert!(json["c"].is_null());
    }
}
