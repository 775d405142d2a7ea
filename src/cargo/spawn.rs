// ============================================
// Spawn - Расписание появления багажа
// ============================================

/// Пересекла ли периодическая отметка `time` (по модулю `modulus`)
/// интервал (prev, curr]. Предыдущий тик исключён, текущий включён,
/// поэтому неровные кадры не дают ни двойных, ни пропущенных срабатываний.
pub fn has_time_passed(prev: f64, curr: f64, modulus: f64, time: f64) -> bool {
    if !(modulus > 0.0) || curr <= prev {
        return false;
    }
    let p = prev % modulus;
    let c = curr % modulus;
    if p < c {
        p < time && time <= c
    } else {
        (p < time && time <= modulus) || (0.0 <= time && time <= c)
    }
}
