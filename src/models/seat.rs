use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Прямоугольник со схемы зала в том виде, в каком его возвращает скрипт страницы.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectFill {
    pub index: usize,
    #[serde(default)]
    pub color: Option<String>,
}

impl RectFill {
    pub fn new(index: usize, color: impl Into<String>) -> Self {
        Self { index, color: Some(color.into()) }
    }

    /// Цвет в нижнем регистре; `None`, если браузер не вернул заливку.
    pub fn normalized_color(&self) -> Option<String> {
        self.color
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
    }
}

/// Отпечаток места: позиция прямоугольника плюс его цвет.
///
/// Не является постоянным идентификатором: если порядок прямоугольников
/// на странице изменится, отпечатки "переедут" на другие места.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatId(String);

impl SeatId {
    pub fn new(index: usize, normalized_color: &str) -> Self {
        SeatId(format!("rect_{}_{}", index, normalized_color))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeatId {
    fn from(raw: &str) -> Self {
        SeatId(raw.to_string())
    }
}

/// Свободные места: все прямоугольники с заливкой, которой нет среди игнорируемых цветов.
pub fn free_seats(rects: &[RectFill], ignored_colors: &HashSet<String>) -> HashSet<SeatId> {
    rects
        .iter()
        .filter_map(|rect| {
            let color = rect.normalized_color()?;
            if ignored_colors.contains(&color) {
                return None;
            }
            Some(SeatId::new(rect.index, &color))
        })
        .collect()
}

/// Места, которые появились с прошлой проверки.
pub fn new_seats(current: &HashSet<SeatId>, previous: Option<&HashSet<SeatId>>) -> HashSet<SeatId> {
    match previous {
        Some(previous) => current.difference(previous).cloned().collect(),
        None => current.clone(),
    }
}
