pub mod compare;
pub mod impedance;
pub mod locate;
pub mod simulate;
pub mod table;
