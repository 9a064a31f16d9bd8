pub mod common;


#[cfg(test)]
mod test_protection;


#[cfg(test)]
mod test_multi_hit;

#[cfg(test)]
mod test_delayed_attack;



#[cfg(test)]
mod test_presentation;
