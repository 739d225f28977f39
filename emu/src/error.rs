use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open config: {0}")]
    ConfigOpen(String, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(String, #[source] serde_yaml::Error),

    #[error("Failed to open image: {0}")]
    ImageOpen(String, #[source] std::io::Error),

    #[error("Image of {size} bytes does not fit in ${from:04X}-${to:04X}")]
    ImageTooLarge { size: usize, from: u16, to: u16 },

    #[error("Address range ${0:04X}-${1:04X} is inverted")]
    RangeInverted(u16, u16),
}
