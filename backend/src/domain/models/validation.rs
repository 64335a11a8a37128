pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TIMES_PER_WEEK: u32 = 100;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChoreValidationError {
    #[error("Chore name cannot be empty")]
    EmptyName,
    #[error("Chore name cannot exceed 100 characters")]
    NameTooLong,
    #[error("A chore must happen at least once per week")]
    ZeroTimesPerWeek,
    #[error("A chore cannot happen more than 100 times per week")]
    TooManyPerWeek,
    #[error("Floor cannot be blank; leave it unset instead")]
    BlankFloor,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PersonValidationError {
    #[error("Person name cannot be empty")]
    EmptyName,
    #[error("Person name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Invalid day of week: {0}. Must be 0-6 (Sunday-Saturday)")]
    InvalidDayOfWeek(u8),
    #[error("Floor cannot be blank; leave it unset instead")]
    BlankFloor,
}

pub fn validate_chore_name(name: &str) -> Result<(), ChoreValidationError> {
    if name.trim().is_empty() {
        return Err(ChoreValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ChoreValidationError::NameTooLong);
    }
    Ok(())
}

pub fn validate_times_per_week(times_per_week: u32) -> Result<(), ChoreValidationError> {
    match times_per_week {
        0 => Err(ChoreValidationError::ZeroTimesPerWeek),
        n if n > MAX_TIMES_PER_WEEK => Err(ChoreValidationError::TooManyPerWeek),
        _ => Ok(()),
    }
}

pub fn validate_person_name(name: &str) -> Result<(), PersonValidationError> {
    if name.trim().is_empty() {
        return Err(PersonValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(PersonValidationError::NameTooLong);
    }
    Ok(())
}
