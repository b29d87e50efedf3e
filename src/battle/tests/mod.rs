#[cfg(test)]
pub mod common;



#[cfg(test)]
mod test_damage;

#[cfg(test)]
mod test_triggers;

#[cfg(test)]
mod test_move_execution;
