mod admission;
mod finalize;
mod randomness;
