#[cfg(test)]
pub mod common;


#[cfg(test)]
mod test_lifecycle;



#[cfg(test)]
mod test_ai;

#[cfg(test)]
mod test_abilities;
