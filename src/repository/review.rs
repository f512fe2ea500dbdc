use diesel::prelude::*;

use crate::domain::review::{
    NewReview as DomainNewReview, Review as DomainReview, ReviewListQuery, ReviewWithTour,
    UpdateReview as DomainUpdateReview,
};
use crate::models::review::{
    NewReview as DbNewReview, Review as DbReview, UpdateReview as DbUpdateReview,
};
use crate::repository::{DieselRepository, RepositoryResult, ReviewReader, ReviewWriter};

impl ReviewReader for DieselRepository {
    fn get_review_by_id(&self, id: i32) -> RepositoryResult<Option<DomainReview>> {
        use crate::schema::reviews;

        let mut conn = self.conn()?;
        let review = reviews::table
            .filter(reviews::id.eq(id))
            .first::<DbReview>(&mut conn)
            .optional()?;

        Ok(review.map(Into::into))
    }

    fn list_reviews_by_tour(&self, tour_id: i32) -> RepositoryResult<Vec<DomainReview>> {
        use crate::schema::reviews;

        let mut conn = self.conn()?;
        let db_reviews = reviews::table
            .filter(reviews::tour_id.eq(tour_id))
            .load::<DbReview>(&mut conn)?;

        Ok(db_reviews.into_iter().map(DomainReview::from).collect())
    }

    fn list_reviews(
        &self,
        query: ReviewListQuery,
    ) -> RepositoryResult<(usize, Vec<ReviewWithTour>)> {
        use crate::schema::{reviews, tours};

        let mut conn = self.conn()?;

        let mut count_query = reviews::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(tour_id) = query.tour_id {
            count_query = count_query.filter(reviews::tour_id.eq(tour_id));
        }
        if let Some(user_id) = query.user_id {
            count_query = count_query.filter(reviews::user_id.eq(user_id));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items_query = reviews::table
            .left_join(tours::table)
            .select((DbReview::as_select(), tours::name.nullable()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(tour_id) = query.tour_id {
            items_query = items_query.filter(reviews::tour_id.eq(tour_id));
        }
        if let Some(user_id) = query.user_id {
            items_query = items_query.filter(reviews::user_id.eq(user_id));
        }

        items_query = items_query.order((reviews::created_at.desc(), reviews::id.desc()));

        if let Some(pagination) = &query.pagination {
            let page = pagination.page.max(1);
            let per_page = pagination.per_page as i64;
            let offset = ((page - 1) * pagination.per_page) as i64;
            items_query = items_query.offset(offset).limit(per_page);
        }

        let rows = items_query.load::<(DbReview, Option<String>)>(&mut conn)?;
        let reviews = rows
            .into_iter()
            .map(|(review, tour_name)| ReviewWithTour {
                review: review.into(),
                tour_name,
            })
            .collect();

        Ok((total, reviews))
    }
}

impl ReviewWriter for DieselRepository {
    fn create_review(&self, new_review: &DomainNewReview) -> RepositoryResult<DomainReview> {
        use crate::schema::reviews;

        let mut conn = self.conn()?;
        let insertable = DbNewReview::from(new_review);

        let created = diesel::insert_into(reviews::table)
            .values(&insertable)
            .get_result::<DbReview>(&mut conn)?;

        Ok(created.into())
    }

    fn update_review(
        &self,
        review_id: i32,
        updates: &DomainUpdateReview,
    ) -> RepositoryResult<DomainReview> {
        use crate::schema::reviews;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateReview::from(updates);

        let updated = diesel::update(reviews::table.filter(reviews::id.eq(review_id)))
            .set(&db_updates)
            .get_result::<DbReview>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_review(&self, review_id: i32) -> RepositoryResult<DomainReview> {
        use crate::schema::reviews;

        let mut conn = self.conn()?;

        // RETURNING hands back the tour reference of the row being removed.
        let deleted = diesel::delete(reviews::table.filter(reviews::id.eq(review_id)))
            .get_result::<DbReview>(&mut conn)?;

        Ok(deleted.into())
    }
}
