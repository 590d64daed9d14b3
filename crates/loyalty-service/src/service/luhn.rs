//! 订单号结构校验
//!
//! Luhn 校验和：从右向左每隔一位数字翻倍，大于 9 减 9，
//! 全部求和后模 10 为零即通过。订单号长度限定 10–19 位十进制数字。

/// 校验订单号是否为合法的 Luhn 编号
pub fn is_valid(number: &str) -> bool {
    if number.len() < 10 || number.len() > 19 {
        return false;
    }
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut sum = 0u32;
    let mut double = false;
    for b in number.bytes().rev() {
        let mut d = u32::from(b - b'0');
        if double {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
        double = !double;
    }
    sum % 10 == 0
}
