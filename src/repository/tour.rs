use diesel::prelude::*;

use crate::domain::tour::{NewTour as DomainNewTour, RatingAggregate, Tour as DomainTour};
use crate::models::tour::{NewTour as DbNewTour, Tour as DbTour, TourRatings};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, TourRatingsWriter, TourReader, TourWriter,
};

impl TourReader for DieselRepository {
    fn get_tour_by_id(&self, id: i32) -> RepositoryResult<Option<DomainTour>> {
        use crate::schema::tours;

        let mut conn = self.conn()?;
        let tour = tours::table
            .filter(tours::id.eq(id))
            .first::<DbTour>(&mut conn)
            .optional()?;

        Ok(tour.map(Into::into))
    }

    fn list_tour_ids(&self) -> RepositoryResult<Vec<i32>> {
        use crate::schema::tours;

        let mut conn = self.conn()?;
        let ids = tours::table
            .select(tours::id)
            .order(tours::id.asc())
            .load::<i32>(&mut conn)?;

        Ok(ids)
    }
}

impl TourWriter for DieselRepository {
    fn create_tour(&self, new_tour: &DomainNewTour) -> RepositoryResult<DomainTour> {
        use crate::schema::tours;

        let mut conn = self.conn()?;
        let insertable = DbNewTour::from(new_tour);

        let created = diesel::insert_into(tours::table)
            .values(&insertable)
            .get_result::<DbTour>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_tour(&self, tour_id: i32) -> RepositoryResult<()> {
        use crate::schema::tours;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(tours::table.filter(tours::id.eq(tour_id))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl TourRatingsWriter for DieselRepository {
    fn set_tour_ratings(&self, tour_id: i32, ratings: &RatingAggregate) -> RepositoryResult<()> {
        use crate::schema::tours;

        let mut conn = self.conn()?;
        let changes = TourRatings::from(ratings);

        let updated = diesel::update(tours::table.filter(tours::id.eq(tour_id)))
            .set(&changes)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
