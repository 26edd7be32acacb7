//! 식별 키 / 금액 정규화
//!
//! - 이름 라벨 `"홍길동[VIP]"` → `"홍길동"`
//! - 금액 문자열 `"₩12,345원"` → `"12345"`

use regex::Regex;

/// 라벨에서 비교용 이름 키를 추출
///
/// 첫 번째 `[` 앞부분을 공백 제거해서 반환한다. `[`가 없으면 전체를 trim.
pub fn normalize_name(raw: &str) -> &str {
    match raw.split_once('[') {
        Some((name, _)) => name.trim(),
        None => raw.trim(),
    }
}

/// ASCII 숫자 이외의 문자를 모두 제거
pub fn normalize_amount(raw: &str) -> String {
    lazy_static::lazy_static! {
        static ref NON_DIGIT_RE: Regex = Regex::new(r"[^0-9]").unwrap();
    }
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// 정규화된 숫자 문자열을 정수로 변환
///
/// 빈 문자열이나 범위를 넘는 값은 0으로 취급한다.
pub fn coerce_amount(digits: &str) -> i64 {
    digits.parse().unwrap_or(0)
}

/// 금액 셀 텍스트 → 정수 (정규화 + 변환)
pub fn parse_amount(raw: &str) -> i64 {
    coerce_amount(&normalize_amount(raw))
}
