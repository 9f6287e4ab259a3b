use serde::{Deserialize, Serialize};

/// Место в том виде, как его объявляет контейнер страницы.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatElement {
    /// Идентификатор из атрибута элемента - единственный источник identity.
    pub id: String,
    /// Текст на кнопке места, только для отображения.
    pub label: String,
    #[serde(default)]
    pub occupied: bool,
}

impl SeatElement {
    pub fn available(id: impl Into<String>) -> Self {
        let id = id.into();
        Self { label: id.clone(), id, occupied: false }
    }

    pub fn occupied(id: impl Into<String>) -> Self {
        Self { occupied: true, ..Self::available(id) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub id: String,
    pub label: String,
    pub occupied: bool,
    pub selected: bool,
}

impl From<SeatElement> for Seat {
    fn from(element: SeatElement) -> Self {
        Seat {
            id: element.id,
            label: element.label,
            occupied: element.occupied,
            selected: false,
        }
    }
}
