// ==========================================
// 炉次化学成分录入系统 - 提交校验器
// ==========================================
// 职责: 提交前的本地校验与输入转换（不访问存储）
// 顺序:
// 1. 炉次选择
// 2. 17 个元素按固定顺序做 [0, 100] 范围校验，首个越界即中止
// 3. 原始文本 → Number / Absent（宽松解析）
// 4. 备注去空白，空串视为缺失
// ==========================================

use crate::api::dto::{ChemistryInput, HeatInput};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::chemistry::{Composition, NewChemistryRecord};
use crate::domain::heat::NewHeat;
use crate::domain::types::{is_valid_percent, normalize_optional_text, parse_numeric, Element, Measurement};

/// 校验炉表单
pub fn validate_new_heat(input: &HeatInput) -> ApiResult<NewHeat> {
    NewHeat::new(&input.heat_code, &input.supplier).ok_or(ApiError::EmptyHeatCode)
}

/// 校验炉次选择
pub fn validate_heat_selection(heat_id: Option<i64>) -> ApiResult<i64> {
    heat_id.ok_or(ApiError::MissingHeatSelection)
}

/// 按固定元素顺序做范围校验
///
/// 只有“非空且能解析为数字”的输入参与校验；非数字文本放行（后续按缺失处理）。
/// 无穷大视为越界。
pub fn validate_element_ranges(input: &ChemistryInput) -> ApiResult<()> {
    for element in Element::ALL {
        if let Some(value) = parse_numeric(input.raw(element)) {
            if !is_valid_percent(value) {
                return Err(ApiError::ElementOutOfRange { element, value });
            }
        }
    }
    Ok(())
}

/// 原始输入 → 成分（不做范围校验）
pub fn parse_composition(input: &ChemistryInput) -> Composition {
    let mut composition = Composition::default();
    for element in Element::ALL {
        composition.set(element, Measurement::parse(input.raw(element)));
    }
    composition
}

/// 完整的化学成分提交校验
///
/// # 返回
/// - Ok(NewChemistryRecord): 可直接写入
/// - Err(MissingHeatSelection): 未选择炉次
/// - Err(ElementOutOfRange): 首个越界元素
pub fn validate_chemistry(heat_id: Option<i64>, input: &ChemistryInput) -> ApiResult<NewChemistryRecord> {
    let heat_id = validate_heat_selection(heat_id)?;
    validate_element_ranges(input)?;

    Ok(NewChemistryRecord {
        heat_id,
        composition: parse_composition(input),
        others: normalize_optional_text(&input.others),
    })
}
