/// Position on the prize ladder, useful for status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub index: usize,
    pub total: usize,
    pub prize: &'static str,
    pub time_left: u32,
    pub is_finished: bool,
}

